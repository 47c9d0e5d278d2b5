use crate::error::RpcError;
use crate::rpc::envelope::{RpcRequest, RpcResponse, Subscription};

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use log::{debug, info};
use tokio::time::timeout as with_deadline;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// Request id used for the subscribe handshake.
pub const SUBSCRIBE_REQUEST_ID: u64 = 1;

/// Send one request and wait for exactly one reply.
///
/// Control frames are skipped while waiting; the first data frame is the reply.
///
/// # Errors
///
/// - [`RpcError::Send`] / [`RpcError::Read`] on transport failure
/// - [`RpcError::Closed`] if the peer closes before replying
/// - [`RpcError::Decode`] if the reply is not a JSON-RPC envelope
/// - [`RpcError::Timeout`] if nothing arrives within `deadline`
pub async fn call<S>(
    conn: &mut S,
    request: &RpcRequest,
    deadline: Duration,
) -> Result<RpcResponse, RpcError>
where
    S: Sink<Message, Error = WsError> + Stream<Item = Result<Message, WsError>> + Unpin,
{
    match with_deadline(deadline, exchange(conn, request)).await {
        Ok(result) => result,
        Err(_) => Err(RpcError::Timeout {
            method: request.method.clone(),
            timeout_secs: deadline.as_secs(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

async fn exchange<S>(conn: &mut S, request: &RpcRequest) -> Result<RpcResponse, RpcError>
where
    S: Sink<Message, Error = WsError> + Stream<Item = Result<Message, WsError>> + Unpin,
{
    let body = request.to_json()?;
    debug!("Sending request: {body}");

    conn.send(Message::text(body))
        .await
        .map_err(|e| RpcError::Send {
            message: format!("Failed to send '{}' request: {e}", request.method),
            location: ErrorLocation::from(Location::caller()),
        })?;

    while let Some(message) = conn.next().await {
        let message = message.map_err(|e| RpcError::Read {
            message: format!("Failed to read '{}' reply: {e}", request.method),
            location: ErrorLocation::from(Location::caller()),
        })?;

        match message {
            Message::Text(text) => {
                debug!("Received reply: {}", text.as_str());
                return RpcResponse::from_text(text.as_str());
            }
            Message::Binary(data) => return RpcResponse::from_slice(&data),
            Message::Close(_) => return Err(RpcError::closed(&request.method)),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        }
    }

    Err(RpcError::closed(&request.method))
}

/// Subscribe to `topic` and return the id the node assigned.
///
/// The reply is checked before the caller starts consuming notifications: an
/// error object fails with [`RpcError::Rejected`], a reply without an id fails
/// with [`RpcError::Handshake`].
pub async fn subscribe<S>(
    conn: &mut S,
    topic: &str,
    deadline: Duration,
) -> Result<Subscription, RpcError>
where
    S: Sink<Message, Error = WsError> + Stream<Item = Result<Message, WsError>> + Unpin,
{
    let request = RpcRequest::subscribe(SUBSCRIBE_REQUEST_ID, topic);
    info!("Sending subscription request for '{topic}'");

    let response = call(conn, &request, deadline).await?.into_result()?;
    info!("Received subscription response: {response:?}");

    let id = response.subscription_id().ok_or_else(|| {
        RpcError::handshake(format!("'{topic}' reply carried no subscription id"))
    })?;

    Ok(Subscription::new(id))
}
