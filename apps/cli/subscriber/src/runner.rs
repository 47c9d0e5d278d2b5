//! Drives a subscriber run to completion.
//!
//! The protocol client hands back a notification stream; this module consumes
//! it, logging every payload, until the node disconnects or the operator asks
//! for shutdown.

use crate::error::SubscriberError;

use subscriber_core::config::SubscriberConfig;
use subscriber_core::error::StreamError;
use subscriber_core::notifications::{Notification, NotificationStream};
use subscriber_core::subscriber::Subscriber;

use std::future::Future;

use futures_util::{Stream, StreamExt};
use log::{error, info, warn};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// How a run ended.
#[derive(Debug)]
pub struct RunSummary {
    pub delivered: u64,
    pub skipped: u64,
    /// `None` when the run was stopped by a shutdown request.
    pub disconnect: Option<StreamError>,
}

/// Subscribe with `config` and log notifications until disconnect or Ctrl-C.
///
/// # Errors
///
/// Any failure before the notification loop starts is fatal.
pub async fn run(config: SubscriberConfig) -> Result<RunSummary, SubscriberError> {
    let subscriber = Subscriber::new(config);
    let (subscription, stream) = subscriber.listen().await?;
    info!("Consuming notifications for subscription {subscription}");

    Ok(consume(stream, shutdown_signal()).await)
}

/// Log every payload from `stream` until it ends or `shutdown` resolves.
pub async fn consume<S, F>(mut stream: NotificationStream<S>, shutdown: F) -> RunSummary
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut disconnect = None;

    loop {
        tokio::select! {
            item = stream.next() => match item {
                Some(Ok(notification)) => {
                    info!("{}", notification_line(&notification));
                }
                Some(Err(e)) => {
                    if e.is_clean_close() {
                        warn!("Connection closed by node: {e}");
                    } else {
                        error!("Error reading message: {e}");
                    }
                    disconnect = Some(e);
                }
                None => break,
            },
            _ = &mut shutdown => {
                info!("Shutdown requested, leaving notification loop");
                break;
            }
        }
    }

    let summary = RunSummary {
        delivered: stream.delivered(),
        skipped: stream.skipped(),
        disconnect,
    };
    info!(
        "Notification loop ended: {} delivered, {} skipped",
        summary.delivered, summary.skipped
    );
    summary
}

/// Log line for one notification, whatever topic produced it.
pub(crate) fn notification_line(notification: &Notification) -> String {
    format!(
        "Notification for {}: {}",
        notification.subscription, notification.payload
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C, running until disconnect: {e}");
        std::future::pending::<()>().await;
    }
}
