//! Push notifications after a completed subscribe handshake.
//!
//! [`NotificationStream`] turns the raw message stream into a lazy sequence of
//! [`Notification`]s. A message that does not decode is logged and skipped;
//! one bad message must not end the stream. The first close or transport
//! error is yielded once as a [`StreamError`] and the stream then ends for
//! good. There is no reconnect.
//!
//! ```no_run
//! # async fn run(mut stream: subscriber_core::notifications::NotificationStream<subscriber_core::connection::WsConnection>) {
//! use futures_util::StreamExt;
//!
//! while let Some(item) = stream.next().await {
//!     match item {
//!         Ok(notification) => println!("{}", notification.payload),
//!         Err(disconnect) => eprintln!("{disconnect}"),
//!     }
//! }
//! # }
//! ```

use crate::error::{RpcError, StreamError};
use crate::rpc::{Payload, RpcResponse, Subscription};

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::FusedStream;
use futures_util::{Stream, StreamExt, ready};
use log::{debug, warn};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subscription: String,
    pub payload: Payload,
}

impl From<RpcResponse> for Notification {
    fn from(response: RpcResponse) -> Self {
        Notification {
            subscription: response.params.subscription,
            payload: response.params.result,
        }
    }
}

/// Decode one raw message as a notification envelope.
pub fn decode_notification(bytes: &[u8]) -> Result<Notification, RpcError> {
    RpcResponse::from_slice(bytes).map(Notification::from)
}

pub struct NotificationStream<S> {
    inner: S,
    subscription: Option<Subscription>,
    finished: bool,
    delivered: u64,
    skipped: u64,
}

impl<S> NotificationStream<S>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            subscription: None,
            finished: false,
            delivered: 0,
            skipped: 0,
        }
    }

    pub fn with_subscription(inner: S, subscription: Subscription) -> Self {
        Self {
            subscription: Some(subscription),
            ..Self::new(inner)
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Notifications yielded so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Messages dropped because they did not decode.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn finish(&mut self, error: StreamError) -> Poll<Option<Result<Notification, StreamError>>> {
        self.finished = true;
        debug!(
            "Notification stream finished after {} delivered, {} skipped",
            self.delivered, self.skipped
        );
        Poll::Ready(Some(Err(error)))
    }

    fn check_subscription(&self, notification: &Notification) {
        if let Some(expected) = &self.subscription
            && !notification.subscription.is_empty()
            && notification.subscription != expected.id()
        {
            debug!(
                "Notification for subscription {} while subscribed to {}",
                notification.subscription, expected
            );
        }
    }
}

impl<S> Stream for NotificationStream<S>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    type Item = Result<Notification, StreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        loop {
            let message = match ready!(this.inner.poll_next_unpin(cx)) {
                Some(Ok(message)) => message,
                Some(Err(e)) => return this.finish(StreamError::read(e.to_string())),
                None => return this.finish(StreamError::closed(None, "connection ended")),
            };

            let decoded = match &message {
                Message::Text(text) => {
                    debug!("Raw message received: {}", text.as_str());
                    decode_notification(text.as_bytes())
                }
                Message::Binary(data) => decode_notification(data),
                Message::Close(frame) => {
                    let (code, reason) = frame
                        .as_ref()
                        .map(|f| (Some(u16::from(f.code)), f.reason.as_str().to_string()))
                        .unwrap_or((None, String::from("closed by peer")));
                    return this.finish(StreamError::closed(code, reason));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };

            match decoded {
                Ok(notification) => {
                    this.check_subscription(&notification);
                    this.delivered += 1;
                    return Poll::Ready(Some(Ok(notification)));
                }
                Err(e) => {
                    this.skipped += 1;
                    warn!("Error decoding message, skipping: {e}");
                }
            }
        }
    }
}

impl<S> FusedStream for NotificationStream<S>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.finished
    }
}
