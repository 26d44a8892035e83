//! Integration tests for the interop client against a mock HTTP server

use chrono::NaiveDate;
use keyfed::adapters::interop::{FederationSource, InteropClient};
use keyfed::adapters::secrets::DirectorySecretProvider;
use keyfed::config::{load_config_from, secret_string};
use keyfed::domain::{BatchTag, InteropError, KeyFedError, ReportType, TestType};
use mockito::Matcher;
use std::collections::HashMap;
use std::time::Duration;

const BATCH_PATH: &str = "/diagnosiskeys/download/2021-03-01";

fn batch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
}

fn client(server: &mockito::Server) -> InteropClient {
    InteropClient::new(
        &server.url(),
        secret_string("secret-token".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
}

const BATCH_BODY: &str = r#"{
  "batchTag": "75b326f7-ae6f-42f6-9354-00c0a6b797b3",
  "exposures": [
    {
      "keyData": "ogNW4Ra+Zdds1ZOOmyntDA==",
      "rollingStartNumber": 2690784,
      "transmissionRiskLevel": 2,
      "rollingPeriod": 144,
      "origin": "JE",
      "regions": ["GB"],
      "testType": "LAB_RESULT",
      "reportType": "CONFIRMED_TEST",
      "daysSinceOnset": 0
    },
    {
      "keyData": "EwoHez3CQgdslvdxaf+ztw==",
      "rollingStartNumber": 2690784,
      "transmissionRiskLevel": 4,
      "rollingPeriod": 144,
      "origin": "GB-SCT",
      "regions": ["GB"],
      "testType": "PCR_AT_HOME",
      "reportType": "CONFIRMED_TEST",
      "daysSinceOnset": 2
    }
  ]
}"#;

#[tokio::test]
async fn test_fetch_first_batch_of_day() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", BATCH_PATH)
        .match_header("authorization", "Bearer secret-token")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(BATCH_BODY)
        .create_async()
        .await;

    let batch = client(&server).fetch_batch(None, batch_date()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(
        batch.next_cursor.as_ref().map(|t| t.as_str()),
        Some("75b326f7-ae6f-42f6-9354-00c0a6b797b3")
    );
    assert_eq!(batch.exposures.len(), 2);
    assert_eq!(batch.exposures[0].origin, "JE");
    assert_eq!(batch.exposures[0].test_type, TestType::LabResult);
    assert_eq!(batch.exposures[0].report_type, ReportType::ConfirmedTest);
    // Unknown test types are kept for the policy to reject
    assert_eq!(batch.exposures[1].test_type, TestType::Unknown);
}

#[tokio::test]
async fn test_fetch_sends_batch_tag_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", BATCH_PATH)
        .match_query(Matcher::UrlEncoded("batchTag".into(), "tag-41".into()))
        .with_status(200)
        .with_body(r#"{"batchTag": "tag-42", "exposures": []}"#)
        .create_async()
        .await;

    let cursor = BatchTag::new("tag-41").unwrap();
    let batch = client(&server)
        .fetch_batch(Some(&cursor), batch_date())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(batch.next_cursor, Some(BatchTag::new("tag-42").unwrap()));
    assert!(batch.exposures.is_empty());
}

#[tokio::test]
async fn test_no_content_means_end_of_batches() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", BATCH_PATH)
        .with_status(204)
        .create_async()
        .await;

    let batch = client(&server).fetch_batch(None, batch_date()).await.unwrap();

    assert!(batch.is_exhausted());
    assert!(batch.exposures.is_empty());
}

#[tokio::test]
async fn test_missing_batch_tag_means_end_of_batches() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", BATCH_PATH)
        .with_status(200)
        .with_body(r#"{"exposures": []}"#)
        .create_async()
        .await;

    let batch = client(&server).fetch_batch(None, batch_date()).await.unwrap();

    assert!(batch.is_exhausted());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", BATCH_PATH)
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let err = client(&server)
        .fetch_batch(None, batch_date())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        KeyFedError::Interop(InteropError::ServerError { status: 503, .. })
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rate_limit_is_retryable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", BATCH_PATH)
        .with_status(429)
        .create_async()
        .await;

    let err = client(&server)
        .fetch_batch(None, batch_date())
        .await
        .unwrap_err();

    assert!(matches!(err, KeyFedError::Interop(InteropError::RateLimited(_))));
    assert!(err.is_retryable());
}

// The token is read once per invocation, so a retried invocation picks up a
// rotated credential
#[tokio::test]
async fn test_rejected_token_is_retryable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", BATCH_PATH)
        .with_status(401)
        .create_async()
        .await;

    let err = client(&server)
        .fetch_batch(None, batch_date())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        KeyFedError::Interop(InteropError::AuthenticationFailed { status: 401 })
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_client_error_is_retryable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", BATCH_PATH)
        .with_status(404)
        .create_async()
        .await;

    let err = client(&server)
        .fetch_batch(None, batch_date())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        KeyFedError::Interop(InteropError::ClientError { status: 404, .. })
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unparseable_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", BATCH_PATH)
        .with_status(200)
        .with_body(r#"{"batchTag": "tag-1", "exposures": [{"keyData": 12"#)
        .create_async()
        .await;

    let err = client(&server)
        .fetch_batch(None, batch_date())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        KeyFedError::Interop(InteropError::MalformedResponse(_))
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_record_missing_field_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", BATCH_PATH)
        .with_status(200)
        .with_body(r#"{"batchTag": "tag-1", "exposures": [{"keyData": "ogNW4Ra+Zdds1ZOOmyntDA=="}]}"#)
        .create_async()
        .await;

    let err = client(&server)
        .fetch_batch(None, batch_date())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        KeyFedError::Interop(InteropError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_connect_resolves_token_once_from_secret_directory() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Regex(r"^/diagnosiskeys/download/".to_string()))
        .match_header("authorization", "Bearer mounted-token")
        .with_status(204)
        .expect(2)
        .create_async()
        .await;

    let secrets = tempfile::tempdir().unwrap();
    std::fs::write(secrets.path().join("interop-token"), "mounted-token\n").unwrap();

    let server_url = server.url();
    let env: HashMap<&str, &str> = HashMap::from([
        ("WORKSPACE", "te-test"),
        ("DOWNLOAD_ENABLED_WORKSPACES", "te-test"),
        ("MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT", "5"),
        ("INITIAL_DOWNLOAD_HISTORY_DAYS", "14"),
        ("DOWNLOAD_RISK_LEVEL_DEFAULT_ENABLED", "false"),
        ("DOWNLOAD_RISK_LEVEL_DEFAULT", "7"),
        ("SUBMISSION_BUCKET_NAME", "submissions"),
        ("INTEROP_BASE_URL", server_url.as_str()),
        ("INTEROP_AUTH_TOKEN_SECRET_NAME", "interop-token"),
        ("FEDERATED_KEY_DOWNLOAD_PREFIX", "federatedKeyDownload"),
        ("PROCESSOR_STATE_TABLE", "federation_state"),
        ("VALID_DOWNLOAD_ORIGINS", "JE"),
        ("STATE_BACKEND", "file"),
    ]);
    let config = load_config_from(|key| env.get(key).map(|v| v.to_string())).unwrap();

    // The token file is read at connect time only
    let client = InteropClient::connect(&config, &DirectorySecretProvider::new(secrets.path()))
        .await
        .unwrap();
    std::fs::remove_file(secrets.path().join("interop-token")).unwrap();

    client.fetch_batch(None, batch_date()).await.unwrap();
    client.fetch_batch(None, batch_date()).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_connect_fails_without_secret() {
    let secrets = tempfile::tempdir().unwrap();
    let env: HashMap<&str, &str> = HashMap::from([
        ("WORKSPACE", "te-test"),
        ("DOWNLOAD_ENABLED_WORKSPACES", "te-test"),
        ("MAX_SUBSEQUENT_BATCH_DOWNLOAD_COUNT", "5"),
        ("INITIAL_DOWNLOAD_HISTORY_DAYS", "14"),
        ("DOWNLOAD_RISK_LEVEL_DEFAULT_ENABLED", "false"),
        ("DOWNLOAD_RISK_LEVEL_DEFAULT", "7"),
        ("SUBMISSION_BUCKET_NAME", "submissions"),
        ("INTEROP_BASE_URL", "http://localhost:9"),
        ("INTEROP_AUTH_TOKEN_SECRET_NAME", "interop-token"),
        ("FEDERATED_KEY_DOWNLOAD_PREFIX", "federatedKeyDownload"),
        ("PROCESSOR_STATE_TABLE", "federation_state"),
        ("VALID_DOWNLOAD_ORIGINS", "JE"),
        ("STATE_BACKEND", "file"),
    ]);
    let config = load_config_from(|key| env.get(key).map(|v| v.to_string())).unwrap();

    let err = InteropClient::connect(&config, &DirectorySecretProvider::new(secrets.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, KeyFedError::Secret(_)));
    assert!(!err.is_retryable());
}
