use crate::helpers::{
    MockNodeScript, TEST_SECRET_HEX, TEST_SUBSCRIPTION_ID, pending_tx, start_mock_node,
    subscribe_ack,
};

use subscriber_core::auth::Claims;
use subscriber_core::config::SubscriberConfig;
use subscriber_core::error::{ConfigError, CoreError, RpcError, StreamError, TokenError};
use subscriber_core::subscriber::Subscriber;

use common::RedactedSecret;

use std::time::Duration;

use futures_util::StreamExt;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(port: u16) -> SubscriberConfig {
    let mut config = SubscriberConfig::new(RedactedSecret::new(TEST_SECRET_HEX), "127.0.0.1");
    config.ws_port = port;
    config.request_timeout = Duration::from_secs(5);
    config
}

/// **VALUE**: Verifies the whole pipeline: token, connect, subscribe, notifications, close.
///
/// **WHY THIS MATTERS**: This is exactly what the binary does. A node that acks the
/// subscription, pushes N pending transactions and hangs up must produce N payloads
/// in order followed by one disconnect signal.
///
/// **BUG THIS CATCHES**: Would catch the handshake ack being delivered as a notification,
/// lost or reordered payloads, or the stream outliving the connection.
#[tokio::test]
async fn given_node_pushing_three_transactions_when_listening_then_yields_three_in_order() {
    // GIVEN: A node that acks and pushes three transactions, then closes
    let hashes = ["0xaaa1", "0xbbb2", "0xccc3"];
    let mut replies = vec![subscribe_ack()];
    replies.extend(hashes.iter().map(|h| pending_tx(h)));
    let node = start_mock_node(MockNodeScript::replying(replies)).await;
    let subscriber = Subscriber::new(config_for(node.port));

    // WHEN: Listening until the stream ends
    let (subscription, mut stream) = subscriber.listen().await.expect("listen should succeed");
    let mut payloads = Vec::new();
    let mut disconnect = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(notification) => {
                assert_eq!(notification.subscription, TEST_SUBSCRIPTION_ID);
                payloads.push(notification.payload.as_str().unwrap().to_string());
            }
            Err(e) => disconnect = Some(e),
        }
    }

    // THEN: Three payloads in order, then a clean close
    assert_eq!(payloads, hashes);
    assert!(matches!(disconnect, Some(StreamError::Closed { .. })));
    assert_eq!(subscription.id(), TEST_SUBSCRIPTION_ID);
    assert_eq!(stream.subscription(), Some(&subscription));

    // AND: The node received a valid 10-minute HS256 token
    let captured = node.captured().await;
    let token = captured
        .authorization
        .as_deref()
        .and_then(|v| v.strip_prefix("Bearer "))
        .expect("bearer token");
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    let key = hex::decode(TEST_SECRET_HEX).unwrap();
    let claims = decode::<Claims>(token, &DecodingKey::from_secret(&key), &validation)
        .expect("node should be able to verify the token")
        .claims;
    assert_eq!(claims.exp - claims.iat, 600);
}

/// **VALUE**: Verifies a malformed notification on the live socket is skipped.
///
/// **BUG THIS CATCHES**: Would catch the real connection path ending on a bad frame even
/// though the mock-channel unit test passes.
#[tokio::test]
async fn given_malformed_middle_notification_when_listening_then_first_and_third_delivered() {
    let replies = vec![
        subscribe_ack(),
        pending_tx("0x01"),
        Message::text("{\"jsonrpc\":\"2.0\",\"params\":"),
        pending_tx("0x03"),
    ];
    let node = start_mock_node(MockNodeScript::replying(replies)).await;
    let subscriber = Subscriber::new(config_for(node.port));

    let (_, mut stream) = subscriber.listen().await.unwrap();
    let mut payloads = Vec::new();
    while let Some(Ok(notification)) = stream.next().await {
        payloads.push(notification.payload.to_string());
    }

    assert_eq!(payloads, vec!["0x01", "0x03"]);
    assert_eq!(stream.skipped(), 1);
}

/// **VALUE**: Verifies a non-hex secret fails before any network action.
///
/// **WHY THIS MATTERS**: A bad secret can never succeed; connecting anyway would only
/// produce a confusing 401 and load on the node.
///
/// **BUG THIS CATCHES**: Would catch reordering the phases so the connection opens first.
#[tokio::test]
async fn given_non_hex_secret_when_listening_then_fails_without_connecting() {
    // GIVEN: A listener that records any connection attempt
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = config_for(listener.local_addr().unwrap().port());
    config.secret = RedactedSecret::new("not-a-hex-secret");

    // WHEN: Listening
    let result = Subscriber::new(config).listen().await;

    // THEN: Decode error and no connection was attempted
    assert!(matches!(
        result,
        Err(CoreError::Token(TokenError::Decode { .. }))
    ));
    let attempt = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
    assert!(attempt.is_err(), "no connection should have been attempted");
}

/// **VALUE**: Verifies the sync check runs on an open connection, before subscribing.
///
/// **WHY THIS MATTERS**: The node is reached over WebSocket first so an unreachable or
/// unauthorised endpoint fails fast. A failing sync check must then abort the run
/// without sending `eth_subscribe`.
///
/// **BUG THIS CATCHES**: Would catch the sync check running before the upgrade, or a
/// failed check being ignored and the subscription sent anyway.
#[tokio::test]
async fn given_failing_sync_check_when_listening_then_connected_but_never_subscribed() {
    // GIVEN: A WebSocket node and an HTTP endpoint that answers 500
    let node = start_mock_node(MockNodeScript::replying(vec![subscribe_ack()])).await;
    let http = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("node unavailable"))
        .expect(1)
        .mount(&http)
        .await;
    let mut config = config_for(node.port);
    config.rpc_port = Some(http.address().port());

    // WHEN: Listening
    let result = Subscriber::new(config).listen().await;

    // THEN: The HTTP failure is fatal, after one upgrade and before any subscribe request
    assert!(matches!(result, Err(CoreError::Rpc(RpcError::Http { .. }))));
    let captured = node.captured().await;
    assert_eq!(captured.upgrades, 1);
    assert_eq!(captured.request, None);
}

/// **VALUE**: Verifies a config built in code with an empty secret fails as a config error.
///
/// **BUG THIS CATCHES**: Would catch `SubscriberConfig::new` bypassing the SECRET_KEY check
/// and surfacing a confusing signing failure instead.
#[tokio::test]
async fn given_empty_secret_when_listening_then_reports_missing_secret_key() {
    let mut config = config_for(1);
    config.secret = RedactedSecret::new("");

    let result = Subscriber::new(config).listen().await;

    assert!(matches!(
        result,
        Err(CoreError::Config(ConfigError::Missing {
            name: "SECRET_KEY",
            ..
        }))
    ));
}
