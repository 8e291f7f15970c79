//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML walk definition → HTTP page requests → records

use clap::Parser;
use pagewalk::cli::{Cli, Runner};
use pagewalk::sequence::Records;
use pagewalk::{
    load_config_from_str, validate_config, DoubleEndedSequence, Error, HttpPageSource,
    HttpSourceConfig, PaginatedIterator, Result, Sequence,
};
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount a meta endpoint and one endpoint per page of `ids`
async fn mount_students(server: &MockServer, ids: &[u64], page_size: usize) {
    let pages: Vec<&[u64]> = ids.chunks(page_size).collect();

    Mock::given(method("GET"))
        .and(path("/students/meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": ids.len(),
            "pages": pages.len(),
        })))
        .mount(server)
        .await;

    for (index, page) in pages.iter().enumerate() {
        let data: Vec<Value> = page.iter().map(|id| json!({"id": id})).collect();
        Mock::given(method("GET"))
            .and(path("/students"))
            .and(query_param("page", index.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": data})))
            .mount(server)
            .await;
    }
}

fn source_config(uri: String) -> HttpSourceConfig {
    HttpSourceConfig::builder()
        .base_url(uri)
        .records("/students", "page", "data")
        .meta("/students/meta", "total", Some("pages".to_string()))
        .timeout(Duration::from_millis(300))
        .build()
}

fn ids<S: Sequence<Item = Value>>(records: Records<S>) -> Vec<u64> {
    records
        .map(|record| record.unwrap()["id"].as_u64().unwrap())
        .collect()
}

// ============================================================================
// HTTP Source + Iterator Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_http_source_forward() {
    let mock_server = MockServer::start().await;
    mount_students(&mock_server, &[1, 2, 3, 4, 5], 2).await;

    let config = source_config(mock_server.uri());
    let walked = tokio::task::spawn_blocking(move || {
        let source = HttpPageSource::new(config).unwrap();
        let walk = PaginatedIterator::new(&source).unwrap();
        assert_eq!(walk.total_records(), 5);
        assert_eq!(walk.total_pages(), 3);
        ids(walk.records())
    })
    .await
    .unwrap();

    assert_eq!(walked, vec![1, 2, 3, 4, 5]);

    let requests = mock_server.received_requests().await.unwrap();
    let meta_requests = requests
        .iter()
        .filter(|request| request.url.path() == "/students/meta")
        .count();
    assert_eq!(meta_requests, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_http_source_reverse() {
    let mock_server = MockServer::start().await;
    mount_students(&mock_server, &[1, 2, 3, 4, 5], 2).await;

    let config = source_config(mock_server.uri());
    let walked = tokio::task::spawn_blocking(move || {
        let source = HttpPageSource::new(config).unwrap();
        ids(PaginatedIterator::new(&source).unwrap().reversed().records())
    })
    .await
    .unwrap();

    assert_eq!(walked, vec![5, 4, 3, 2, 1]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_http_source_meets_in_the_middle() {
    let mock_server = MockServer::start().await;
    mount_students(&mock_server, &[1, 2, 3], 2).await;

    let config = source_config(mock_server.uri());
    let walked = tokio::task::spawn_blocking(move || -> Result<Vec<Value>> {
        let source = HttpPageSource::new(config)?;
        let mut walk = PaginatedIterator::new(&source)?;
        let mut out = Vec::new();
        out.push(walk.reverse_next()?);
        out.push(walk.next()?);
        out.push(walk.next()?);
        assert!(!walk.has_next());
        assert!(matches!(walk.next(), Err(Error::EndOfSequence)));
        Ok(out)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(walked, vec![json!({"id": 3}), json!({"id": 1}), json!({"id": 2})]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_retries_gateway_timeouts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/students"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(504))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_students(&mock_server, &[1, 2], 2).await;

    let config = source_config(mock_server.uri());
    let walked = tokio::task::spawn_blocking(move || {
        let source = HttpPageSource::new(config).unwrap();
        ids(PaginatedIterator::with_retries(&source, 2).unwrap().records())
    })
    .await
    .unwrap();

    assert_eq!(walked, vec![1, 2]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_retries_slow_responses() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/students"))
        .and(query_param("page", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"id": 99}]}))
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_students(&mock_server, &[1], 1).await;

    let config = source_config(mock_server.uri());
    let walked = tokio::task::spawn_blocking(move || {
        let source = HttpPageSource::new(config).unwrap();
        ids(PaginatedIterator::with_retries(&source, 1).unwrap().records())
    })
    .await
    .unwrap();

    assert_eq!(walked, vec![1]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_source_unreachable_after_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/students"))
        .respond_with(ResponseTemplate::new(504))
        .with_priority(1)
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_students(&mock_server, &[1, 2, 3], 2).await;

    let config = source_config(mock_server.uri());
    let (err, consumed) = tokio::task::spawn_blocking(move || {
        let source = HttpPageSource::new(config).unwrap();
        let mut walk = PaginatedIterator::with_retries(&source, 2).unwrap();
        let err = walk.next().unwrap_err();
        (err, walk.consumed())
    })
    .await
    .unwrap();

    assert!(matches!(err, Error::SourceUnreachable { attempts: 3, .. }));
    assert_eq!(consumed, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_walk_fatal_status_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/students"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_students(&mock_server, &[1], 1).await;

    let config = source_config(mock_server.uri());
    let err = tokio::task::spawn_blocking(move || {
        let source = HttpPageSource::new(config).unwrap();
        PaginatedIterator::with_retries(&source, 5)
            .unwrap()
            .next()
            .unwrap_err()
    })
    .await
    .unwrap();

    assert!(matches!(err, Error::HttpStatus { status: 403, .. }));
}

// ============================================================================
// CLI Runner Tests
// ============================================================================

fn walk_file(uri: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
kind: walk
name: students
source:
  base_url: "{uri}"
  records:
    path: /students
    records_field: data
  meta:
    path: /students/meta
    total_records_field: total
    total_pages_field: pages
  timeout_seconds: 5
retry:
  retries: 1
"#
    )
    .unwrap();
    file
}

async fn run_cli(args: Vec<String>) -> Result<String> {
    tokio::task::spawn_blocking(move || -> Result<String> {
        let runner = Runner::new(Cli::parse_from(args));
        let mut out = Vec::new();
        runner.run_to(&mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    })
    .await
    .unwrap()
}

fn args(file: &NamedTempFile, rest: &[&str]) -> Vec<String> {
    let mut args = vec![
        "pagewalk".to_string(),
        "--config".to_string(),
        file.path().display().to_string(),
    ];
    args.extend(rest.iter().map(|arg| arg.to_string()));
    args
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_count() {
    let mock_server = MockServer::start().await;
    mount_students(&mock_server, &[1, 2, 3], 2).await;
    let file = walk_file(&mock_server.uri());

    let output = run_cli(args(&file, &["count"])).await.unwrap();
    let value: Value = serde_json::from_str(output.trim()).unwrap();

    assert_eq!(
        value,
        json!({"name": "students", "total_records": 3, "total_pages": 2})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_read_reverse_with_limit() {
    let mock_server = MockServer::start().await;
    mount_students(&mock_server, &[1, 2, 3, 4, 5], 2).await;
    let file = walk_file(&mock_server.uri());

    let output = run_cli(args(&file, &["read", "--reverse", "--limit", "3"]))
        .await
        .unwrap();
    let lines: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(
        lines,
        vec![json!({"id": 5}), json!({"id": 4}), json!({"id": 3})]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_read_forward() {
    let mock_server = MockServer::start().await;
    mount_students(&mock_server, &[7, 8, 9], 2).await;
    let file = walk_file(&mock_server.uri());

    let output = run_cli(args(&file, &["read"])).await.unwrap();
    assert_eq!(output, "{\"id\":7}\n{\"id\":8}\n{\"id\":9}\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_page() {
    let mock_server = MockServer::start().await;
    mount_students(&mock_server, &[1, 2, 3], 2).await;
    let file = walk_file(&mock_server.uri());

    let output = run_cli(args(&file, &["page", "1"])).await.unwrap();
    let value: Value = serde_json::from_str(output.trim()).unwrap();

    assert_eq!(value, json!([{"id": 3}]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_validate() {
    let file = walk_file("https://api.example.com");

    let output = run_cli(args(&file, &["validate"])).await.unwrap();
    let value: Value = serde_json::from_str(output.trim()).unwrap();

    assert_eq!(value["status"], "valid");
    assert_eq!(value["name"], "students");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_retries_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/students"))
        .respond_with(ResponseTemplate::new(504))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_students(&mock_server, &[1], 1).await;
    let file = walk_file(&mock_server.uri());

    let err = run_cli(args(&file, &["--retries", "0", "read"]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SourceUnreachable { attempts: 1, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_missing_config() {
    let err = run_cli(vec!["pagewalk".to_string(), "count".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[test]
fn test_validate_programmatic_config() {
    let mut config = load_config_from_str(
        r#"
name: students
source:
  base_url: "https://api.example.com"
  records:
    path: /students
  meta:
    path: /students/meta
    total_records_field: total
    total_pages_field: pages
"#,
    )
    .unwrap();

    config.source.meta.total_pages_field = None;
    assert!(matches!(
        validate_config(&config),
        Err(Error::InvalidConfigValue { .. })
    ));

    config.source.records.page_size = Some(25);
    assert!(validate_config(&config).is_ok());
}
