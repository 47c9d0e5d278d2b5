use crate::helpers::{
    MockNodeScript, TEST_SECRET_HEX, TEST_SUBSCRIPTION_ID, start_mock_node, subscribe_ack,
};

use subscriber_core::auth::issue_token;
use subscriber_core::connection::{WsConnection, connect, endpoint_url};
use subscriber_core::error::RpcError;
use subscriber_core::rpc::{RpcRequest, call, subscribe};

use std::time::Duration;

use tokio_tungstenite::tungstenite::Message;

const DEADLINE: Duration = Duration::from_secs(5);

async fn connect_to(port: u16) -> WsConnection {
    let credential = issue_token(TEST_SECRET_HEX).unwrap();
    let endpoint = endpoint_url("127.0.0.1", port).unwrap();
    connect(&endpoint, &credential, DEADLINE)
        .await
        .expect("Failed to connect to mock node")
}

/// **VALUE**: Verifies the subscribe handshake sends the exact request and returns the id.
///
/// **WHY THIS MATTERS**: The node only starts pushing once it has accepted exactly this
/// request. The returned id is what later notifications are tagged with.
///
/// **BUG THIS CATCHES**: Would catch any drift in the outbound JSON or failing to read
/// the id from a top-level `result`.
#[tokio::test]
async fn given_mock_node_when_subscribe_then_sends_exact_request_and_returns_id() {
    // GIVEN: A node that acks the subscription
    let node = start_mock_node(MockNodeScript::replying(vec![subscribe_ack()])).await;
    let mut conn = connect_to(node.port).await;

    // WHEN: Subscribing to pending transactions
    let subscription = subscribe(&mut conn, "newPendingTransactions", DEADLINE)
        .await
        .expect("subscribe should succeed");
    drop(conn);
    let captured = node.captured().await;

    // THEN: Request was byte-exact and the id came back
    assert_eq!(
        captured.request.as_deref(),
        Some(r#"{"jsonrpc":"2.0","id":1,"method":"eth_subscribe","params":["newPendingTransactions"]}"#)
    );
    assert_eq!(subscription.id(), TEST_SUBSCRIPTION_ID);
}

/// **VALUE**: Verifies a malformed first reply fails with a decode error.
///
/// **WHY THIS MATTERS**: The handshake reply decides whether the stream exists at all;
/// garbage here must be fatal, unlike garbage inside the notification loop.
///
/// **BUG THIS CATCHES**: Would catch the correlator looping past a bad reply.
#[tokio::test]
async fn given_malformed_reply_when_call_then_returns_decode_error() {
    let node =
        start_mock_node(MockNodeScript::replying(vec![Message::text("<html>oops</html>")])).await;
    let mut conn = connect_to(node.port).await;

    let result = call(&mut conn, &RpcRequest::syncing(1), DEADLINE).await;

    assert!(
        matches!(result, Err(RpcError::Decode { .. })),
        "expected decode error, got {result:?}"
    );
}

/// **VALUE**: Verifies a JSON-RPC error reply to `eth_subscribe` is a rejection.
///
/// **BUG THIS CATCHES**: Would catch entering the notification loop on a node that does
/// not support the requested topic.
#[tokio::test]
async fn given_error_reply_when_subscribe_then_returns_rejected() {
    let reply = Message::text(
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid subscription"}}"#,
    );
    let node = start_mock_node(MockNodeScript::replying(vec![reply])).await;
    let mut conn = connect_to(node.port).await;

    let result = subscribe(&mut conn, "noSuchTopic", DEADLINE).await;

    assert!(matches!(result, Err(RpcError::Rejected { code: -32602, .. })));
}

#[tokio::test]
async fn given_reply_without_id_when_subscribe_then_returns_handshake_error() {
    let reply = Message::text(r#"{"jsonrpc":"2.0","id":1,"result":true}"#);
    let node = start_mock_node(MockNodeScript::replying(vec![reply])).await;
    let mut conn = connect_to(node.port).await;

    let result = subscribe(&mut conn, "newPendingTransactions", DEADLINE).await;

    assert!(matches!(result, Err(RpcError::Handshake { .. })));
}

/// **VALUE**: Verifies a silent node trips the request deadline.
///
/// **WHY THIS MATTERS**: Without a deadline a node that accepts the upgrade but never
/// replies would hang the subscriber forever before it logs anything useful.
///
/// **BUG THIS CATCHES**: Would catch the deadline being dropped from `call`.
#[tokio::test]
async fn given_silent_node_when_call_then_returns_timeout() {
    let node = start_mock_node(MockNodeScript::silent()).await;
    let mut conn = connect_to(node.port).await;

    let result = call(
        &mut conn,
        &RpcRequest::pending_transactions(1),
        Duration::from_millis(200),
    )
    .await;

    assert!(matches!(result, Err(RpcError::Timeout { .. })));
}

#[tokio::test]
async fn given_node_closing_without_reply_when_call_then_returns_closed() {
    let node = start_mock_node(MockNodeScript::replying(Vec::new())).await;
    let mut conn = connect_to(node.port).await;

    let result = call(&mut conn, &RpcRequest::syncing(1), DEADLINE).await;

    assert!(matches!(result, Err(RpcError::Closed { .. })));
}
