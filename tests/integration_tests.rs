use chrono::NaiveDate;
use clap::Parser;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use weather_history::cli::{run, Cli};
use weather_history::models::{AggregatedStat, ObservationFilter};
use weather_history::processors::{IngestionOrchestrator, StatsOrchestrator};
use weather_history::store::{AggregateStore, Database, ObservationStore};
use weather_history::WeatherError;

fn write_upload(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("Failed to write upload file");
    path
}

#[test]
fn test_upload_then_stats_round() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db = Database::open(&temp_dir.path().join("weather.db")).unwrap();

    let tokyo = write_upload(
        temp_dir.path(),
        "tokyo.txt",
        "20210101\t20\t10\t1\n20210701\t30\t20\t2\n20211231\t-9999\t5\t40\n20220101\t5\t-3\t0\n",
    );

    let ingestion = IngestionOrchestrator::new(db.observations());
    let report = ingestion.ingest_file(&tokyo, None).unwrap();
    assert_eq!(report.inserted, 4);

    let stats = StatsOrchestrator::new(db.observations(), db.aggregates());
    let response = stats.compute_stats(&ObservationFilter::new()).unwrap();

    assert_eq!(
        response.results,
        vec![
            AggregatedStat::new("tokyo".to_string(), 2021, 25.0, 15.0, 3.0),
            AggregatedStat::new("tokyo".to_string(), 2022, 5.0, -3.0, 0.0),
        ]
    );
    assert_eq!(response.newly_persisted, 2);

    // Sentinel rows stay stored even though they are not aggregated
    let sentinel_day = ObservationFilter::new()
        .with_start_date(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap())
        .with_end_date(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap());
    let rows: Vec<_> = db
        .observations()
        .query(&sentinel_day)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].observation.max_temp, -9999);
}

#[test]
fn test_partial_ingestion_survives_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("weather.db");

    let upload = write_upload(
        temp_dir.path(),
        "osaka.txt",
        "20210101\t20\t10\t1\n20210102\t21\t11\t0\n20210103\t22\t12\n20210104\t23\t13\t0\n",
    );

    {
        let db = Database::open(&db_path).unwrap();
        let err = IngestionOrchestrator::new(db.observations())
            .ingest_file(&upload, None)
            .unwrap_err();
        assert!(matches!(err, WeatherError::MalformedRecord { line: 3, .. }));
    }

    let db = Database::open(&db_path).unwrap();
    let stored = db
        .observations()
        .query(&ObservationFilter::new().with_location("osaka"))
        .unwrap()
        .count();
    assert_eq!(stored, 2);
}

#[test]
fn test_stale_aggregate_is_kept() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db = Database::open(&temp_dir.path().join("weather.db")).unwrap();
    let ingestion = IngestionOrchestrator::new(db.observations());
    let stats = StatsOrchestrator::new(db.observations(), db.aggregates());

    let first = write_upload(temp_dir.path(), "kyoto.txt", "20200101\t10\t0\t1\n");
    ingestion.ingest_file(&first, None).unwrap();
    stats.compute_stats(&ObservationFilter::new()).unwrap();

    // New data for the same year arrives after the aggregate was cached
    let later = write_upload(temp_dir.path(), "kyoto.dat", "20200601\t30\t20\t5\n");
    ingestion.ingest_file(&later, None).unwrap();
    let response = stats.compute_stats(&ObservationFilter::new()).unwrap();

    assert_eq!(response.results[0].avg_max_temp, 20.0);
    assert_eq!(response.newly_persisted, 0);

    let cached = db.aggregates().get("kyoto", 2020).unwrap().unwrap();
    assert_eq!(cached.stat.avg_max_temp, 10.0);
    assert_eq!(cached.stat.sum_precipitation_amount, 1.0);
}

#[test]
fn test_missing_tables_surface_as_server_errors() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("weather.db");
    let db = Database::open(&db_path).unwrap();

    // Break the schema underneath the open handle
    rusqlite::Connection::open(&db_path)
        .unwrap()
        .execute_batch("DROP TABLE weather_history; DROP TABLE weather_aggregated_data;")
        .unwrap();

    let ingestion = IngestionOrchestrator::new(db.observations());
    let err = ingestion
        .ingest("tokyo.txt", "20210101\t20\t10\t1\n".as_bytes(), None)
        .unwrap_err();
    assert!(matches!(err, WeatherError::StoreUnavailable(_)));
    assert!(!err.is_client_error());

    let stats = StatsOrchestrator::new(db.observations(), db.aggregates());
    let err = stats.compute_stats(&ObservationFilter::new()).unwrap_err();
    assert!(matches!(err, WeatherError::StoreUnavailable(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_cli_upload_list_and_stats() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("cli.db");
    let upload = write_upload(temp_dir.path(), "nagoya.txt", "20190315\t12\t3\t8\n");

    let db_arg = db_path.to_str().unwrap();
    let file_arg = upload.to_str().unwrap();

    run(Cli::try_parse_from(["weather-history", "--database", db_arg, "-q", "upload", "--file", file_arg]).unwrap())
        .await
        .unwrap();
    run(Cli::try_parse_from(["weather-history", "--database", db_arg, "list", "--location", "nagoya"]).unwrap())
        .await
        .unwrap();
    run(Cli::try_parse_from(["weather-history", "--database", db_arg, "stats"]).unwrap())
        .await
        .unwrap();

    let db = Database::open(&db_path).unwrap();
    let cached = db.aggregates().get("nagoya", 2019).unwrap().unwrap();
    assert_eq!(cached.stat.sum_precipitation_amount, 8.0);
}

#[tokio::test]
async fn test_cli_rejects_bad_inputs() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("cli.db");
    let db_arg = db_path.to_str().unwrap();

    let bad_name = write_upload(temp_dir.path(), "no_extension", "20190315\t12\t3\t8\n");
    let err = run(Cli::try_parse_from([
        "weather-history",
        "--database",
        db_arg,
        "-q",
        "upload",
        "--file",
        bad_name.to_str().unwrap(),
    ])
    .unwrap())
    .await
    .unwrap_err();
    assert!(matches!(err, WeatherError::InvalidFileName(_)));
    assert!(err.is_client_error());

    let err = run(Cli::try_parse_from([
        "weather-history",
        "--database",
        db_arg,
        "stats",
        "--end-date",
        "31/12/2020",
    ])
    .unwrap())
    .await
    .unwrap_err();
    assert!(matches!(err, WeatherError::Validation(_)));
}
