/// Reserved reading meaning "no valid measurement"
pub const SENTINEL_VALUE: i16 = -9999;

/// Location identifiers are short codes taken from upload file names
pub const MAX_LOCATION_LENGTH: usize = 50;

/// Date formats
pub const RECORD_DATE_FORMAT: &str = "%Y%m%d";
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Record layout
pub const FIELD_SEPARATOR: char = '\t';
pub const FIELD_COUNT: usize = 4;

/// Processing defaults
pub const DEFAULT_DATABASE_PATH: &str = "weather.db";
pub const DEFAULT_CONFIG_FILE: &str = "weather-history.toml";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Upload response
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Records are created.";
