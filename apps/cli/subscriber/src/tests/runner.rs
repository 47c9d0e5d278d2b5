// Unit tests for the notification consumer

use crate::runner::{consume, notification_line};

use subscriber_core::error::StreamError;
use subscriber_core::notifications::{NotificationStream, decode_notification};

use std::future::pending;

use futures_util::stream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

fn pending_tx(hash: &str) -> Result<Message, WsError> {
    Ok(Message::text(format!(
        r#"{{"jsonrpc":"2.0","method":"eth_subscription","params":{{"subscription":"0x1","result":"{hash}"}}}}"#
    )))
}

/// **VALUE**: Verifies the consumer runs until the stream's disconnect signal and reports counts.
///
/// **WHY THIS MATTERS**: The run summary is the last thing the operator sees. It must say
/// how many payloads arrived, how many were dropped, and why the loop ended.
///
/// **BUG THIS CATCHES**: Would catch the loop exiting on the first skipped message or
/// losing the final disconnect reason.
#[tokio::test]
async fn given_stream_with_bad_message_when_consumed_then_summary_counts_both() {
    // GIVEN: Two good notifications around a bad one, then end of stream
    let channel = stream::iter(vec![
        pending_tx("0x01"),
        Ok(Message::text("garbage")),
        pending_tx("0x02"),
    ]);

    // WHEN: Consuming with no shutdown request
    let summary = consume(NotificationStream::new(channel), pending::<()>()).await;

    // THEN: Counts and disconnect reason are reported
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.skipped, 1);
    assert!(matches!(summary.disconnect, Some(StreamError::Closed { .. })));
}

/// **VALUE**: Verifies a shutdown request stops an otherwise endless stream.
///
/// **BUG THIS CATCHES**: Would catch the select ignoring the shutdown future.
#[tokio::test]
async fn given_shutdown_requested_when_consuming_then_stops_without_disconnect() {
    // GIVEN: A stream that never yields
    let channel = stream::pending::<Result<Message, WsError>>();

    // WHEN: Shutdown resolves immediately
    let summary = consume(NotificationStream::new(channel), async {}).await;

    // THEN: No disconnect recorded
    assert_eq!(summary.delivered, 0);
    assert!(summary.disconnect.is_none());
}

/// **VALUE**: Verifies the per-notification log line fits topics other than pending transactions.
///
/// **WHY THIS MATTERS**: `SUBSCRIPTION_TOPIC` can select `newHeads` or `logs`, whose payloads
/// are objects. Labelling every one of them a "pending transaction" misleads the operator.
///
/// **BUG THIS CATCHES**: Would catch a hardcoded topic name in the log line or a payload
/// rendered through Debug instead of as JSON.
#[test]
fn given_block_header_notification_when_formatted_then_line_names_subscription_and_payload() {
    // GIVEN: A newHeads-style notification with an object payload
    let notification = decode_notification(
        br#"{"jsonrpc":"2.0","method":"eth_subscription","params":{"subscription":"0xheads","result":{"number":"0x1b4"}}}"#,
    )
    .unwrap();

    // WHEN: Formatting the log line
    let line = notification_line(&notification);

    // THEN: Subscription id and JSON payload, no topic-specific wording
    assert_eq!(line, r#"Notification for 0xheads: {"number":"0x1b4"}"#);
    assert!(!line.contains("pending transaction"));
}
