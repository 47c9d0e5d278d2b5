use crate::helpers::TEST_SECRET_HEX;

use subscriber_core::auth::issue_token;
use subscriber_core::config::SubscriberConfig;
use subscriber_core::error::{CoreError, RpcError};
use subscriber_core::rpc::{HttpRpcClient, SyncStatus};
use subscriber_core::subscriber::Subscriber;

use common::RedactedSecret;

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEADLINE: Duration = Duration::from_secs(5);

/// **VALUE**: Verifies the pre-flight `eth_syncing` call posts the right body with a bearer JWT.
///
/// **WHY THIS MATTERS**: The HTTP endpoint is authenticated the same way as the WebSocket.
/// Sending the raw hex secret instead of a signed token is rejected by real nodes.
///
/// **BUG THIS CATCHES**: Would catch the wrong content type, a non-empty params array, or
/// the raw secret in the Authorization header.
#[tokio::test]
async fn given_synced_node_when_checking_sync_status_then_reports_synced() {
    // GIVEN: A node answering eth_syncing with false
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/json"))
        .and(body_json(
            json!({"jsonrpc": "2.0", "id": 1, "method": "eth_syncing", "params": []}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": false})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let credential = issue_token(TEST_SECRET_HEX).unwrap();
    let client = HttpRpcClient::new(Url::parse(&server.uri()).unwrap(), &credential, DEADLINE)
        .unwrap();

    // WHEN: Checking sync status
    let status = client.check_sync_status().await.expect("check should succeed");

    // THEN: Synced, and the signed token was presented
    assert_eq!(status, SyncStatus::Synced);
    let requests = server.received_requests().await.unwrap();
    let authorization = requests[0]
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(authorization, credential.bearer());
    assert_ne!(authorization, format!("Bearer {TEST_SECRET_HEX}"));
}

/// **VALUE**: Verifies an HTTP 401 is reported with its status code.
///
/// **BUG THIS CATCHES**: Would catch decoding the error page as JSON and reporting a
/// decode error instead of the real cause.
#[tokio::test]
async fn given_node_rejecting_token_when_checking_sync_status_then_returns_http_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("missing token"))
        .mount(&server)
        .await;
    let credential = issue_token(TEST_SECRET_HEX).unwrap();
    let client = HttpRpcClient::new(Url::parse(&server.uri()).unwrap(), &credential, DEADLINE)
        .unwrap();

    let result = client.check_sync_status().await;

    match result {
        Err(RpcError::Http { status_code, message, .. }) => {
            assert!(status_code.is_auth_rejection());
            assert_eq!(message, "missing token");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_syncing_node_when_subscriber_checks_then_returns_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"currentBlock": "0x10", "highestBlock": "0x20"}
        })))
        .mount(&server)
        .await;
    let mut config = SubscriberConfig::new(RedactedSecret::new(TEST_SECRET_HEX), "127.0.0.1");
    config.rpc_port = Some(server.address().port());
    let subscriber = Subscriber::new(config);
    let credential = subscriber.issue_credential().unwrap();

    let status = subscriber.check_sync_status(&credential).await.unwrap();

    match status {
        Some(SyncStatus::Syncing(progress)) => assert_eq!(progress["highestBlock"], "0x20"),
        other => panic!("expected syncing, got {other:?}"),
    }
}

#[tokio::test]
async fn given_no_rpc_port_when_subscriber_checks_then_skips() {
    let config = SubscriberConfig::new(RedactedSecret::new(TEST_SECRET_HEX), "127.0.0.1");
    let subscriber = Subscriber::new(config);
    let credential = subscriber.issue_credential().unwrap();

    let status = subscriber.check_sync_status(&credential).await;

    assert!(matches!(status, Ok(None)));
}

#[tokio::test]
async fn given_garbage_body_when_checking_sync_status_then_subscriber_reports_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let mut config = SubscriberConfig::new(RedactedSecret::new(TEST_SECRET_HEX), "127.0.0.1");
    config.rpc_port = Some(server.address().port());
    let subscriber = Subscriber::new(config);
    let credential = subscriber.issue_credential().unwrap();

    let result = subscriber.check_sync_status(&credential).await;

    assert!(matches!(
        result,
        Err(CoreError::Rpc(RpcError::Decode { .. }))
    ));
}
