pub mod record_parser;

pub use record_parser::{location_from_filename, RecordParser};
