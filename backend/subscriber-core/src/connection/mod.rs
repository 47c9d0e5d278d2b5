//! WebSocket connection establishment.
//!
//! Opens `ws://<host>:<port>/`, presents the credential as a bearer token on
//! the upgrade request and offers the `jsonrpc` sub-protocol. A node that
//! does not negotiate sub-protocols is upgraded once more without the offer.
//! Any other failure is fatal to the run.

use crate::auth::Credential;
use crate::error::ConnectError;
use crate::{HTTP_URL_PREFIX, JSONRPC_SUBPROTOCOL, WS_URL_PREFIX};

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use log::{debug, info};
use tokio::net::TcpStream;
use tokio::time::timeout as with_deadline;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::error::{ProtocolError, SubProtocolError};
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

pub type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// `ws://<host>:<port>/`
pub fn endpoint_url(host: &str, port: u16) -> Result<Url, ConnectError> {
    Ok(Url::parse(&format!("{WS_URL_PREFIX}{host}:{port}/"))?)
}

/// `http://<host>:<port>/`, for the HTTP sync check.
pub fn http_endpoint_url(host: &str, port: u16) -> Result<Url, ConnectError> {
    Ok(Url::parse(&format!("{HTTP_URL_PREFIX}{host}:{port}/"))?)
}

/// Open the WebSocket and complete the upgrade handshake.
///
/// The `jsonrpc` sub-protocol is offered first. A node that answers without
/// echoing it is upgraded again without the offer, since plain JSON-RPC nodes
/// do not negotiate sub-protocols. Both attempts share `deadline`.
///
/// # Errors
///
/// - [`ConnectError::Header`] if the token cannot be carried in a header
/// - [`ConnectError::Rejected`] if the node answers the upgrade with an HTTP error (401 on a bad token)
/// - [`ConnectError::Handshake`] for DNS, TCP or protocol failures
/// - [`ConnectError::Timeout`] if the upgrade does not finish within `deadline`
pub async fn connect(
    endpoint: &Url,
    credential: &Credential,
    deadline: Duration,
) -> Result<WsConnection, ConnectError> {
    info!("Connecting to WebSocket URL: {endpoint}");

    let conn = match with_deadline(deadline, upgrade(endpoint, credential)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ConnectError::Timeout {
                timeout_secs: deadline.as_secs(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };
    info!("Connected to {endpoint}");

    Ok(conn)
}

async fn upgrade(endpoint: &Url, credential: &Credential) -> Result<WsConnection, ConnectError> {
    let request = upgrade_request(endpoint, credential, true)?;
    match connect_async(request).await {
        Ok((conn, response)) => {
            if let Some(protocol) = response.headers().get(SEC_WEBSOCKET_PROTOCOL) {
                debug!("Negotiated sub-protocol: {:?}", protocol);
            }
            Ok(conn)
        }
        Err(WsError::Protocol(ProtocolError::SecWebSocketSubProtocolError(
            SubProtocolError::NoSubProtocol,
        ))) => {
            debug!(
                "Node did not confirm the {JSONRPC_SUBPROTOCOL} sub-protocol, upgrading without it"
            );
            let request = upgrade_request(endpoint, credential, false)?;
            let (conn, _) = connect_async(request).await?;
            Ok(conn)
        }
        Err(e) => Err(e.into()),
    }
}

fn upgrade_request(
    endpoint: &Url,
    credential: &Credential,
    offer_protocol: bool,
) -> Result<Request, ConnectError> {
    let mut request = endpoint.as_str().into_client_request()?;
    let bearer = HeaderValue::from_str(&credential.bearer()).map_err(|e| ConnectError::Header {
        message: format!("Bearer token is not a valid header value: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let headers = request.headers_mut();
    headers.insert(AUTHORIZATION, bearer);
    if offer_protocol {
        headers.insert(
            SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_static(JSONRPC_SUBPROTOCOL),
        );
    }
    Ok(request)
}
