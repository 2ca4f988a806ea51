use crate::error::Result;
use crate::models::ObservationFilter;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-history")]
#[command(about = "Ingest daily weather observations and compute yearly statistics")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress the progress spinner")]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        help = "Configuration file [default: weather-history.toml if present]"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "SQLite database path (overrides configuration)")]
    pub database: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a tab-delimited observation file named <location>.<ext>
    Upload {
        #[arg(short, long, help = "Observation file, e.g. USC00110072.txt")]
        file: PathBuf,
    },

    /// List stored observations as JSON
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Compute yearly statistics per location and cache them
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

/// Raw filter parameters, validated by [`FilterArgs::to_filter`]
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long, help = "Earliest record date, inclusive (YYYY-MM-DD)")]
    pub start_date: Option<String>,

    #[arg(long, help = "Latest record date, inclusive (YYYY-MM-DD)")]
    pub end_date: Option<String>,

    #[arg(long, help = "Exact location identifier")]
    pub location: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<ObservationFilter> {
        ObservationFilter::from_params(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            self.location.as_deref(),
        )
    }
}
