//! Contract tests for HttpRegistrationSink against the table's REST interface.
//!
//! ## Endpoint Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/rest/v1/regional_registrations` | `insert_*` |

use std::time::Duration;

use hb_core::{
    ContactFields, EmailAddress, InterestTag, RegionCode, RegistrationRecord, RegistrationSink,
    SinkError,
};
use hb_sink_client::{HttpRegistrationSink, SinkClientError, SinkConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE_PATH: &str = "/rest/v1/regional_registrations";

fn test_client(mock_server: &MockServer, timeout_secs: u64) -> HttpRegistrationSink {
    let config = SinkConfig {
        base_url: mock_server.uri().parse().unwrap(),
        api_key: zeroize::Zeroizing::new("anon-key".into()),
        table: "regional_registrations".into(),
        timeout_secs,
    };
    HttpRegistrationSink::new(config).unwrap()
}

fn record() -> RegistrationRecord {
    RegistrationRecord {
        region_code: RegionCode::new("pt").unwrap(),
        region_name: "Portugal".into(),
        contact: ContactFields {
            first_name: "Inês".into(),
            last_name: "Costa".into(),
            email: EmailAddress::new("ines@example.pt").unwrap(),
            phone: Some("+351 21 000 0000".into()),
        },
        interest_tags: [InterestTag::Arthritis].into_iter().collect(),
        how_heard: None,
        consent_marketing: false,
        consent_terms: true,
        language: "pt".into(),
        source_context: "/preview/pt".into(),
    }
}

// ── POST /rest/v1/regional_registrations ─────────────────────────────

#[tokio::test]
async fn insert_sends_row_with_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(body_partial_json(serde_json::json!({
            "email": "ines@example.pt",
            "region_code": "PT",
            "region_name": "Portugal",
            "interested_conditions": ["Arthritis"],
            "notification_preferences": {"email": true, "sms": true},
            "source_page": "/preview/pt",
            "consent_terms": true
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 5);
    client.insert(&record()).await.unwrap();
}

#[tokio::test]
async fn insert_maps_unique_violation_to_duplicate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "code": "23505",
            "details": "Key (email, region_code)=(ines@example.pt, PT) already exists.",
            "message": "duplicate key value violates unique constraint"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 5);
    let err = client.insert(&record()).await.unwrap_err();
    assert_eq!(
        err,
        SinkError::Duplicate {
            email: "ines@example.pt".into(),
            region: RegionCode::new("pt").unwrap(),
        }
    );
}

#[tokio::test]
async fn insert_maps_server_error_to_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 5);
    match client.insert(&record()).await.unwrap_err() {
        SinkError::Unavailable { reason } => assert!(reason.contains("503")),
        other => panic!("expected Unavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn insert_maps_client_error_to_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"code":"PGRST204","message":"column not found"}"#),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 5);
    match client.insert(&record()).await.unwrap_err() {
        SinkError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("PGRST204"));
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
}

#[tokio::test]
async fn insert_maps_slow_response_to_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 1);
    let err = client.insert(&record()).await.unwrap_err();
    assert_eq!(err, SinkError::Timeout { elapsed_ms: 1000 });
}

#[tokio::test]
async fn insert_row_exposes_raw_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 5);
    match client.insert_row(&record()).await.unwrap_err() {
        SinkClientError::ApiError { status, endpoint, body } => {
            assert_eq!(status, 401);
            assert_eq!(endpoint, format!("POST {TABLE_PATH}"));
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected ApiError, got: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_sink_is_unavailable() {
    // Nothing listens on a port whose listener has been dropped.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut config = SinkConfig::local_mock(port, "anon-key").unwrap();
    config.timeout_secs = 2;
    let client = HttpRegistrationSink::new(config).unwrap();
    assert!(matches!(
        client.insert(&record()).await.unwrap_err(),
        SinkError::Unavailable { .. }
    ));
}
