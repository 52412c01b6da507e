//! End-to-end pipeline tests against local mock HTTP sources.

use chrono::{TimeZone, Utc};
use hostagg::config::{Config, OutputFormat, Source};
use hostagg::error::HostaggError;
use hostagg::fetcher::Fetcher;
use hostagg::lock::LockGuard;
use hostagg::pipeline;
use hostagg::record::{Action, AggregatedRecord, RecordDefaults};
use hostagg::stats::SourceStatus;
use std::collections::HashSet;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCE_A: &str = "0.0.0.0 ads.example.com\n# comment\n0.0.0.0 tracker.io\n";
const SOURCE_B: &str = "0.0.0.0 casino.bet\n0.0.0.0 ads.example.com\n";

async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer, dir: &Path, sources: &[(&str, &str)]) -> Config {
    Config {
        sources: sources
            .iter()
            .map(|(category, route)| Source::new(*category, format!("{}{}", server.uri(), route)))
            .collect(),
        output_dir: dir.to_path_buf(),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn read_csv(path: &Path) -> Vec<AggregatedRecord> {
    csv::Reader::from_path(path)
        .unwrap()
        .deserialize()
        .collect::<Result<Vec<AggregatedRecord>, _>>()
        .unwrap()
}

#[tokio::test]
async fn test_first_seen_wins_end_to_end() {
    let server = MockServer::start().await;
    serve(&server, "/a", 200, SOURCE_A).await;
    serve(&server, "/b", 200, SOURCE_B).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path(), &[("Malware", "/a"), ("Gambling", "/b")]);
    let fetcher = Fetcher::new(&config).unwrap();
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let summary = pipeline::run(&config, &fetcher, ts).await.unwrap();
    assert_eq!(summary.unique_entries, 3);
    assert_eq!(summary.total_parsed, 4);
    assert_eq!(summary.sources[1].duplicates, 1);

    let records = read_csv(&dir.path().join("latest.csv"));
    let rows: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.entry.as_str(), r.category.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("ads.example.com", "Malware"),
            ("tracker.io", "Malware"),
            ("casino.bet", "Gambling"),
        ]
    );
    assert!(records.iter().all(|r| r.action == Action::Block && r.is_enabled));
    assert_eq!(records[2].description, "Blocked gambling domain");

    let snapshot = dir.path().join("host_entries_20240501_120000.csv");
    assert_eq!(
        std::fs::read(&snapshot).unwrap(),
        std::fs::read(dir.path().join("latest.csv")).unwrap()
    );
}

#[tokio::test]
async fn test_failed_source_does_not_abort_run() {
    let server = MockServer::start().await;
    serve(&server, "/a", 200, SOURCE_A).await;
    serve(&server, "/broken", 500, "").await;
    serve(&server, "/b", 200, SOURCE_B).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(
        &server,
        dir.path(),
        &[("Malware", "/a"), ("Porn", "/broken"), ("Gambling", "/b")],
    );
    let fetcher = Fetcher::new(&config).unwrap();

    let summary = pipeline::run(&config, &fetcher, Utc::now()).await.unwrap();
    assert_eq!(summary.failed_sources(), 1);
    assert_eq!(summary.sources[1].status, SourceStatus::Failed);
    assert_eq!(summary.sources[1].error_kind, Some("http"));

    let records = read_csv(&dir.path().join("latest.csv"));
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.category != "Porn"));
}

#[tokio::test]
async fn test_all_sources_failing_writes_nothing() {
    let server = MockServer::start().await;
    serve(&server, "/a", 404, "").await;
    serve(&server, "/b", 503, "").await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path(), &[("Malware", "/a"), ("Gambling", "/b")]);
    let fetcher = Fetcher::new(&config).unwrap();

    let err = pipeline::run(&config, &fetcher, Utc::now()).await.unwrap_err();
    assert!(matches!(err, HostaggError::NoEntries));

    let written: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != hostagg::lock::LOCK_FILE_NAME)
        .collect();
    assert!(written.is_empty(), "unexpected files: {:?}", written);
}

#[tokio::test]
async fn test_empty_sources_produce_no_entries_error() {
    let server = MockServer::start().await;
    serve(&server, "/a", 200, "# nothing but comments\n127.0.0.1 localhost\n").await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path(), &[("Malware", "/a")]);
    let fetcher = Fetcher::new(&config).unwrap();

    let err = pipeline::run(&config, &fetcher, Utc::now()).await.unwrap_err();
    assert!(matches!(err, HostaggError::NoEntries));
    assert!(!dir.path().join("latest.csv").exists());
}

#[tokio::test]
async fn test_identical_input_gives_identical_rows() {
    let server = MockServer::start().await;
    serve(&server, "/a", 200, SOURCE_A).await;
    serve(&server, "/b", 200, SOURCE_B).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path(), &[("Malware", "/a"), ("Gambling", "/b")]);
    let fetcher = Fetcher::new(&config).unwrap();

    let first = pipeline::run(&config, &fetcher, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .await
        .unwrap();
    let second = pipeline::run(&config, &fetcher, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        .await
        .unwrap();

    assert_ne!(first.files[0].snapshot, second.files[0].snapshot);
    assert_eq!(
        std::fs::read(&first.files[0].snapshot).unwrap(),
        std::fs::read(&second.files[0].snapshot).unwrap()
    );
}

#[tokio::test]
async fn test_no_duplicate_entries_across_overlapping_sources() {
    let server = MockServer::start().await;
    let shared: String = (0..50)
        .map(|i| format!("0.0.0.0 host{}.example.com\n", i))
        .collect();
    let mixed: String = (25..75)
        .map(|i| format!("127.0.0.1 HOST{}.example.com # dup\n", i))
        .collect();
    serve(&server, "/a", 200, &shared).await;
    serve(&server, "/b", 200, &mixed).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path(), &[("A", "/a"), ("B", "/b")]);
    let fetcher = Fetcher::new(&config).unwrap();

    pipeline::run(&config, &fetcher, Utc::now()).await.unwrap();

    let records = read_csv(&dir.path().join("latest.csv"));
    let unique: HashSet<&str> = records.iter().map(|r| r.entry.as_str()).collect();
    assert_eq!(unique.len(), records.len());
    assert_eq!(records.len(), 75);
    assert_eq!(records.iter().filter(|r| r.category == "A").count(), 50);
}

#[tokio::test]
async fn test_record_defaults_and_extra_formats() {
    let server = MockServer::start().await;
    serve(&server, "/a", 200, SOURCE_A).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, dir.path(), &[("Malware", "/a")]);
    config.formats = vec![OutputFormat::Csv, OutputFormat::Json];
    config.records = RecordDefaults {
        risk: "medium".to_string(),
        is_enabled: false,
    };
    let fetcher = Fetcher::new(&config).unwrap();

    let summary = pipeline::run(&config, &fetcher, Utc::now()).await.unwrap();
    assert_eq!(summary.files.len(), 2);

    let csv_records = read_csv(&dir.path().join("latest.csv"));
    assert!(csv_records.iter().all(|r| r.risk == "medium" && !r.is_enabled));

    let json: Vec<AggregatedRecord> =
        serde_json::from_slice(&std::fs::read(dir.path().join("latest.json")).unwrap()).unwrap();
    assert_eq!(json, csv_records);
}

#[tokio::test]
async fn test_overlapping_run_is_rejected() {
    let server = MockServer::start().await;
    serve(&server, "/a", 200, SOURCE_A).await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&server, dir.path(), &[("Malware", "/a")]);
    let fetcher = Fetcher::new(&config).unwrap();

    let _held = LockGuard::acquire(dir.path()).unwrap();
    let err = pipeline::run(&config, &fetcher, Utc::now()).await.unwrap_err();
    assert!(matches!(err, HostaggError::Locked(_)));
    assert!(!dir.path().join("latest.csv").exists());
}
