use crate::helpers::{
    MockNodeScript, TEST_SECRET_HEX, TEST_SUBSCRIPTION_ID, start_mock_node, subscribe_ack,
};

use subscriber_core::auth::issue_token;
use subscriber_core::connection::{connect, endpoint_url, http_endpoint_url};
use subscriber_core::error::ConnectError;
use subscriber_core::rpc::subscribe;

use std::time::Duration;

use tokio::net::TcpListener;

const DEADLINE: Duration = Duration::from_secs(5);

/// **VALUE**: Verifies the upgrade request carries the bearer token and asks for `jsonrpc`.
///
/// **WHY THIS MATTERS**: Authenticated node endpoints refuse the upgrade without a valid
/// `Authorization: Bearer <jwt>` header. The sub-protocol header is what the original
/// client offered and some proxies route on it.
///
/// **BUG THIS CATCHES**: Would catch a missing `Bearer ` prefix, the raw secret sent
/// instead of the signed token, or the protocol header being dropped.
#[tokio::test]
async fn given_mock_node_when_connect_then_sends_bearer_token_and_subprotocol() {
    // GIVEN: A mock node and a credential
    let node = start_mock_node(MockNodeScript::replying(vec![subscribe_ack()])).await;
    let credential = issue_token(TEST_SECRET_HEX).unwrap();
    let endpoint = endpoint_url("127.0.0.1", node.port).unwrap();

    // WHEN: Connecting and dropping the connection after the upgrade
    let conn = connect(&endpoint, &credential, DEADLINE)
        .await
        .expect("connect should succeed");
    drop(conn);
    let captured = node.captured().await;

    // THEN: Both headers were presented on a single upgrade
    assert_eq!(captured.upgrades, 1);
    assert_eq!(captured.authorization, Some(credential.bearer()));
    assert_eq!(captured.protocol.as_deref(), Some("jsonrpc"));
}

/// **VALUE**: Verifies a node that never confirms the `jsonrpc` sub-protocol is still usable.
///
/// **WHY THIS MATTERS**: Plain JSON-RPC nodes ignore the offered sub-protocol and answer
/// the upgrade without echoing it. tungstenite refuses such a reply, so the client has to
/// upgrade again without the offer instead of giving up.
///
/// **BUG THIS CATCHES**: Would catch `connect` failing with "Server sent no subprotocol"
/// against a real node, or a retry that drops the bearer token.
#[tokio::test]
async fn given_node_without_subprotocol_when_connect_then_upgrades_without_offer() {
    // GIVEN: A node that accepts the upgrade but never echoes a sub-protocol
    let mut script = MockNodeScript::replying(vec![subscribe_ack()]);
    script.echo_protocol = false;
    let node = start_mock_node(script).await;
    let credential = issue_token(TEST_SECRET_HEX).unwrap();
    let endpoint = endpoint_url("127.0.0.1", node.port).unwrap();

    // WHEN: Connecting and subscribing over the resulting connection
    let mut conn = connect(&endpoint, &credential, DEADLINE)
        .await
        .expect("connect should proceed without sub-protocol negotiation");
    let subscription = subscribe(&mut conn, "newPendingTransactions", DEADLINE)
        .await
        .expect("subscribe should succeed on the fallback connection");
    drop(conn);
    let captured = node.captured().await;

    // THEN: The second upgrade carried the token but no protocol offer
    assert_eq!(subscription.id(), TEST_SUBSCRIPTION_ID);
    assert_eq!(captured.upgrades, 2);
    assert_eq!(captured.authorization, Some(credential.bearer()));
    assert_eq!(captured.protocol, None);
}

/// **VALUE**: Verifies an auth rejection during the upgrade is reported as `Rejected(401)`.
///
/// **WHY THIS MATTERS**: A wrong SECRET_KEY is the most common misconfiguration. The
/// operator needs to see "401" rather than a generic handshake failure.
///
/// **BUG THIS CATCHES**: Would catch losing the HTTP status when mapping tungstenite errors.
#[tokio::test]
async fn given_node_expecting_other_token_when_connect_then_returns_auth_rejection() {
    // GIVEN: A node that only accepts a different token
    let mut script = MockNodeScript::silent();
    script.require_bearer = Some(String::from("Bearer something-else"));
    let node = start_mock_node(script).await;
    let credential = issue_token(TEST_SECRET_HEX).unwrap();
    let endpoint = endpoint_url("127.0.0.1", node.port).unwrap();

    // WHEN: Connecting
    let result = connect(&endpoint, &credential, DEADLINE).await;

    // THEN: Rejected with 401
    let Err(err) = result else {
        panic!("upgrade should be refused");
    };
    assert!(err.is_auth_rejection(), "expected auth rejection, got {err}");
    assert!(err.to_string().contains("401"));
}

/// **VALUE**: Verifies a refused TCP connection surfaces as a handshake error, not a panic.
///
/// **BUG THIS CATCHES**: Would catch unwraps in the connect path.
#[tokio::test]
async fn given_no_listener_when_connect_then_returns_handshake_error() {
    // GIVEN: A port that was free a moment ago
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let credential = issue_token(TEST_SECRET_HEX).unwrap();
    let endpoint = endpoint_url("127.0.0.1", port).unwrap();

    // WHEN: Connecting
    let result = connect(&endpoint, &credential, DEADLINE).await;

    // THEN: Handshake error
    assert!(matches!(result, Err(ConnectError::Handshake { .. })));
}

#[test]
fn given_host_and_port_when_building_endpoints_then_root_paths_are_used() {
    assert_eq!(
        endpoint_url("node.local", 8546).unwrap().as_str(),
        "ws://node.local:8546/"
    );
    assert_eq!(
        http_endpoint_url("10.0.0.2", 8545).unwrap().as_str(),
        "http://10.0.0.2:8545/"
    );
    assert!(matches!(
        endpoint_url("bad host", 1),
        Err(ConnectError::Url { .. })
    ));
}
