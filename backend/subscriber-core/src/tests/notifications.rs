// Unit tests for the notification stream over a mock channel

use crate::error::StreamError;
use crate::notifications::{NotificationStream, decode_notification};
use crate::rpc::{RpcResponse, Subscription};

use futures_util::stream::{self, FusedStream};
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

fn notification(hash: &str) -> Result<Message, WsError> {
    Ok(Message::text(format!(
        r#"{{"jsonrpc":"2.0","method":"eth_subscription","params":{{"subscription":"0x9ce5","result":"{hash}"}}}}"#
    )))
}

fn close() -> Result<Message, WsError> {
    Ok(Message::Close(Some(CloseFrame {
        code: CloseCode::Normal,
        reason: "bye".into(),
    })))
}

/// **VALUE**: Verifies handshake + N notifications + close yields exactly N payloads in order.
///
/// **WHY THIS MATTERS**: This is the whole life of a run. Every pending transaction the
/// node pushes must reach the consumer, in arrival order, and the close must surface as
/// one final disconnect signal rather than a hang or a panic.
///
/// **BUG THIS CATCHES**: Would catch dropped or reordered messages, the handshake reply
/// leaking into the notifications, or the stream continuing after close.
#[tokio::test]
async fn given_handshake_then_notifications_then_close_when_consumed_then_yields_n_in_order() {
    // GIVEN: A channel with a handshake reply, 3 notifications and a close
    let hashes = ["0x01", "0x02", "0x03"];
    let mut messages = vec![Ok(Message::text(r#"{"jsonrpc":"2.0","id":1,"result":"0x9ce5"}"#))];
    messages.extend(hashes.iter().map(|h| notification(h)));
    messages.push(close());
    let mut channel = stream::iter(messages);

    // GIVEN: The handshake reply is consumed first
    let ack = channel.next().await.unwrap().unwrap();
    let ack = RpcResponse::from_text(ack.to_text().unwrap()).unwrap();
    let subscription = Subscription::new(ack.subscription_id().unwrap());

    // WHEN: Consuming the rest as notifications
    let mut notifications = NotificationStream::with_subscription(channel, subscription);
    let mut payloads = Vec::new();
    let mut disconnects = Vec::new();
    while let Some(item) = notifications.next().await {
        match item {
            Ok(n) => payloads.push(n.payload.as_str().unwrap().to_string()),
            Err(e) => disconnects.push(e),
        }
    }

    // THEN: Exactly N payloads in order, then one clean disconnect
    assert_eq!(payloads, hashes);
    assert_eq!(disconnects.len(), 1);
    assert!(matches!(
        &disconnects[0],
        StreamError::Closed { code: Some(1000), reason, .. } if reason == "bye"
    ));
    assert_eq!(notifications.delivered(), 3);
    assert!(notifications.is_terminated());
}

/// **VALUE**: Verifies a malformed message in the middle is skipped, not fatal.
///
/// **WHY THIS MATTERS**: One bad frame from the node must not end a long-running stream.
///
/// **BUG THIS CATCHES**: Would catch `?` on the per-message decode inside the loop.
#[tokio::test]
async fn given_second_of_three_malformed_when_consumed_then_first_and_third_delivered() {
    // GIVEN: Payload 1, garbage, payload 3
    let channel = stream::iter(vec![
        notification("0xaa"),
        Ok(Message::text("{not json")),
        notification("0xcc"),
    ]);
    let mut notifications = NotificationStream::new(channel);

    // WHEN: Consuming until the end
    let mut payloads = Vec::new();
    while let Some(Ok(n)) = notifications.next().await {
        payloads.push(n.payload.into_value());
    }

    // THEN: 1 and 3 delivered, 2 counted as skipped
    assert_eq!(payloads, vec!["0xaa", "0xcc"]);
    assert_eq!(notifications.skipped(), 1);
}

/// **VALUE**: Verifies a transport error ends the stream with a read error and nothing after.
///
/// **BUG THIS CATCHES**: Would catch reading past an error (tungstenite panics on
/// reads after `AlreadyClosed`) or swallowing the error silently.
#[tokio::test]
async fn given_read_error_when_consumed_then_yields_read_error_then_ends() {
    let channel = stream::iter(vec![
        notification("0x01"),
        Err(WsError::ConnectionClosed),
        notification("0x02"),
    ]);
    let mut notifications = NotificationStream::new(channel);

    assert!(notifications.next().await.unwrap().is_ok());
    assert!(matches!(
        notifications.next().await,
        Some(Err(StreamError::Read { .. }))
    ));
    assert!(notifications.next().await.is_none());
    assert!(notifications.next().await.is_none());
}

#[tokio::test]
async fn given_control_frames_and_binary_when_consumed_then_only_data_is_delivered() {
    let binary = br#"{"jsonrpc":"2.0","params":{"subscription":"0x1","result":{"hash":"0xbb"}}}"#;
    let channel = stream::iter(vec![
        Ok(Message::Ping(Vec::new().into())),
        Ok(Message::Binary(binary.to_vec().into())),
        Ok(Message::Pong(Vec::new().into())),
    ]);
    let mut notifications = NotificationStream::new(channel);

    let first = notifications.next().await.unwrap().unwrap();
    let end = notifications.next().await.unwrap();

    assert_eq!(first.payload.as_value()["hash"], "0xbb");
    assert!(matches!(end, Err(StreamError::Closed { code: None, .. })));
}

#[test]
fn given_same_bytes_when_decoded_twice_then_notifications_are_equal() {
    let raw = br#"{"jsonrpc":"2.0","params":{"subscription":"0x1","result":[1,2]}}"#;

    assert_eq!(
        decode_notification(raw).unwrap(),
        decode_notification(raw).unwrap()
    );
}
