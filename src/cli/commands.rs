use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::processors::{IngestionOrchestrator, StatsOrchestrator, UploadResponse};
use crate::settings::Settings;
use crate::store::ObservationStore;
use crate::utils::progress::ProgressReporter;
use serde::Serialize;
use tracing::debug;

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        settings.database_path = database;
    }

    setup_logging(&settings, cli.verbose);
    debug!("Using database {}", settings.database_path.display());

    let quiet = cli.quiet;

    match cli.command {
        Commands::Upload { file } => {
            // SQLite calls block, so keep them off the async workers
            let report = tokio::task::spawn_blocking(move || {
                let db = settings.open_database()?;
                let progress = ProgressReporter::new_spinner("Uploading records...", quiet);
                IngestionOrchestrator::new(db.observations()).ingest_file(&file, Some(&progress))
            })
            .await??;

            debug!(
                "Upload of {} took {} ms ({} duplicates ignored)",
                report.location, report.elapsed_ms, report.duplicates
            );
            print_json(&UploadResponse::created())?;
        }

        Commands::List { filter } => {
            let filter = filter.to_filter()?;

            let rows = tokio::task::spawn_blocking(move || {
                let db = settings.open_database()?;
                db.observations().query(&filter)?.collect::<Result<Vec<_>>>()
            })
            .await??;

            print_json(&rows)?;
        }

        Commands::Stats { filter } => {
            let filter = filter.to_filter()?;

            let response = tokio::task::spawn_blocking(move || {
                let db = settings.open_database()?;
                StatsOrchestrator::new(db.observations(), db.aggregates()).compute_stats(&filter)
            })
            .await??;

            print_json(&response)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Log to stderr. RUST_LOG takes precedence over the configured level.
fn setup_logging(settings: &Settings, verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose { "debug" } else { settings.log_level.as_str() };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("weather_history={}", log_level)));

    // A subscriber may already be installed when run() is called repeatedly
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();
}
