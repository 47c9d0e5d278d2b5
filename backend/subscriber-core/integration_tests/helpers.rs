//! Test helpers for subscriber integration tests.
//!
//! Provides a scripted mock node: a WebSocket server that records the upgrade
//! headers and the first request, replays a fixed list of replies and then
//! closes (or stays silent). A node that does not echo the sub-protocol also
//! accepts the client's second upgrade attempt.

use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

pub const TEST_SECRET_HEX: &str = "deadbeef";
pub const TEST_SUBSCRIPTION_ID: &str = "0x9ce59a13059e417087c02d3236a0b1cc";

/// What the mock node saw from the client.
#[derive(Debug, Default, Clone)]
pub struct Captured {
    pub authorization: Option<String>,
    pub protocol: Option<String>,
    pub request: Option<String>,
    /// Upgrade handshakes completed by the server side.
    pub upgrades: u32,
}

pub struct MockNodeScript {
    pub replies: Vec<Message>,
    /// Close after the replies; otherwise hold the connection open silently.
    pub close: bool,
    /// Answer the upgrade with 401 when the bearer token differs.
    pub require_bearer: Option<String>,
    /// Echo a requested sub-protocol back in the upgrade response.
    pub echo_protocol: bool,
}

impl MockNodeScript {
    pub fn replying(replies: Vec<Message>) -> Self {
        Self {
            replies,
            close: true,
            require_bearer: None,
            echo_protocol: true,
        }
    }

    pub fn silent() -> Self {
        Self {
            replies: Vec::new(),
            close: false,
            require_bearer: None,
            echo_protocol: true,
        }
    }
}

pub struct MockNode {
    pub port: u16,
    captured: oneshot::Receiver<Captured>,
}

impl MockNode {
    /// Wait for the mock node to finish its script and return what it saw.
    pub async fn captured(self) -> Captured {
        self.captured.await.expect("mock node task ended without reporting")
    }
}

pub fn subscribe_ack() -> Message {
    Message::text(format!(
        r#"{{"jsonrpc":"2.0","id":1,"result":"{TEST_SUBSCRIPTION_ID}"}}"#
    ))
}

pub fn pending_tx(hash: &str) -> Message {
    Message::text(format!(
        r#"{{"jsonrpc":"2.0","method":"eth_subscription","params":{{"subscription":"{TEST_SUBSCRIPTION_ID}","result":"{hash}"}}}}"#
    ))
}

/// Start a one-connection mock node on an ephemeral localhost port.
pub async fn start_mock_node(script: MockNodeScript) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock node");
    let port = listener.local_addr().unwrap().port();
    let (report, captured) = oneshot::channel();

    tokio::spawn(async move {
        let seen = Arc::new(Mutex::new(Captured::default()));

        let mut ws = loop {
            let (stream, _) = listener.accept().await.expect("accept failed");
            let seen_in_callback = Arc::clone(&seen);
            let require_bearer = script.require_bearer.clone();
            let echo_protocol = script.echo_protocol;

            let callback = move |request: &Request, mut response: Response| {
                let header = |name: HeaderName| {
                    request
                        .headers()
                        .get(name)
                        .and_then(|v: &HeaderValue| v.to_str().ok())
                        .map(str::to_string)
                };
                let authorization = header(AUTHORIZATION);
                let protocol = header(SEC_WEBSOCKET_PROTOCOL);
                {
                    let mut seen = seen_in_callback.lock().unwrap();
                    seen.authorization = authorization.clone();
                    seen.protocol = protocol.clone();
                }

                if let Some(expected) = require_bearer
                    && authorization.as_deref() != Some(expected.as_str())
                {
                    let rejection: ErrorResponse = Response::builder()
                        .status(StatusCode::UNAUTHORIZED)
                        .body(Some(String::from("invalid token")))
                        .unwrap();
                    return Err(rejection);
                }

                if echo_protocol && protocol.is_some() {
                    response
                        .headers_mut()
                        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static("jsonrpc"));
                }
                Ok(response)
            };

            let ws = match accept_hdr_async(stream, callback).await {
                Ok(ws) => ws,
                Err(_) => {
                    let _ = report.send(seen.lock().unwrap().clone());
                    return;
                }
            };

            let declined_offer = {
                let mut seen = seen.lock().unwrap();
                seen.upgrades += 1;
                !script.echo_protocol && seen.protocol.is_some()
            };
            // The client drops this upgrade and retries without the offer.
            if !declined_offer {
                break ws;
            }
        };

        if let Some(Ok(message)) = ws.next().await {
            seen.lock().unwrap().request = message.to_text().ok().map(str::to_string);
        }

        for reply in script.replies {
            if ws.send(reply).await.is_err() {
                break;
            }
        }

        let snapshot = seen.lock().unwrap().clone();
        if script.close {
            let _ = ws
                .send(Message::Close(Some(CloseFrame {
                    code: CloseCode::Normal,
                    reason: "done".into(),
                })))
                .await;
            let _ = report.send(snapshot);
            // Drain until the client acknowledges the close.
            while let Some(Ok(_)) = ws.next().await {}
        } else {
            let _ = report.send(snapshot);
            while let Some(Ok(_)) = ws.next().await {}
        }
    });

    MockNode { port, captured }
}
