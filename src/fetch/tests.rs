//! Fetch tests

use super::*;
use crate::error::Error;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_fetch_config_from_value() {
    let config = FetchConfig::from_value(json!({"headers": {"Authorization": "Bearer t"}})).unwrap();
    assert_eq!(
        config.headers.get("Authorization"),
        Some(&"Bearer t".to_string())
    );
    assert_eq!(config.timeout, Duration::from_secs(30));

    assert!(FetchConfig::from_value(json!({"headers": 1})).is_err());
}

#[test]
fn test_is_url() {
    assert!(is_url("https://example.com/a.json"));
    assert!(is_url("http://localhost:1/a"));
    assert!(!is_url("data/http.json"));
}

#[tokio::test]
async fn test_fetch_url_with_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user.json"))
        .and(header("Authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(FetchConfig::default().header("Authorization", "Bearer t")).unwrap();
    let url = format!("{}/user.json", server.uri());
    let fetched = fetcher.fetch(&url, Path::new(".")).await.unwrap();
    assert_eq!(fetched.data, json!({"id": 1}));
    assert_eq!(fetched.from, url);
}

#[tokio::test]
async fn test_fetch_url_non_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"error\":\"missing\"}"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/nope", server.uri()), Path::new("."))
        .await
        .unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("missing"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_file_with_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fallback-sample.json"), r#"{"a": [1]}"#).unwrap();

    let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
    let fetched = fetcher.fetch("fallback-sample.json", dir.path()).await.unwrap();
    assert_eq!(fetched.data, json!({"a": [1]}));
    assert!(fetched.from.ends_with("fallback-sample.json"));

    let absolute = dir.path().join("fallback-sample.json");
    let fetched = fetcher
        .fetch(&absolute.display().to_string(), Path::new("/nonexistent"))
        .await
        .unwrap();
    assert_eq!(fetched.data, json!({"a": [1]}));

    let err = fetcher.fetch("no-such-input.json", dir.path()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fetch_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bad.json");
    std::fs::write(&file, "{").unwrap();
    let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
    let err = fetcher
        .fetch(&file.display().to_string(), dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::JsonParse(_)));
}

#[tokio::test]
async fn test_fetch_relative_to_base_dir() {
    let base = tempfile::tempdir().unwrap();
    let models = tempfile::tempdir().unwrap();
    std::fs::write(base.path().join("in-base.json"), r#"{"b": 1}"#).unwrap();
    std::fs::write(models.path().join("in-models.json"), r#"{"m": 1}"#).unwrap();

    let fetcher = Fetcher::new(FetchConfig::default())
        .unwrap()
        .with_base_dir(base.path());
    let fetched = fetcher.fetch("in-base.json", models.path()).await.unwrap();
    assert_eq!(fetched.data, json!({"b": 1}));
    assert_eq!(fetched.from, base.path().join("in-base.json").display().to_string());

    let fetched = fetcher.fetch("in-models.json", models.path()).await.unwrap();
    assert_eq!(fetched.data, json!({"m": 1}));
}
