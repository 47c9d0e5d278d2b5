//! JSON-RPC 2.0 envelopes.
//!
//! The node uses one response shape for synchronous replies and for push
//! notifications. Which one a message is depends only on when it arrives.

use crate::error::RpcError;
use crate::{JSONRPC_VERSION, NEW_PENDING_TRANSACTIONS, SUBSCRIBE_METHOD, SYNCING_METHOD};

use common::ErrorLocation;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// `eth_subscribe` for a single named event stream.
    pub fn subscribe(id: u64, topic: &str) -> Self {
        Self::new(id, SUBSCRIBE_METHOD, vec![Value::String(topic.to_string())])
    }

    pub fn pending_transactions(id: u64) -> Self {
        Self::subscribe(id, NEW_PENDING_TRANSACTIONS)
    }

    pub fn syncing(id: u64) -> Self {
        Self::new(id, SYNCING_METHOD, Vec::new())
    }

    pub fn to_json(&self) -> Result<String, RpcError> {
        serde_json::to_string(self).map_err(|e| RpcError::Encode {
            message: format!("Failed to encode '{}' request: {e}", self.method),
            location: ErrorLocation::caller(),
        })
    }
}

/// Opaque handle to the `result` of a notification.
///
/// Kept as a parsed JSON value; the consumer decides how to interpret it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Value);

impl Payload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// String payloads, e.g. a pending transaction hash.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Interpret the payload as `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RpcError> {
        T::deserialize(&self.0).map_err(|e| RpcError::decode(format!("payload: {e}")))
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{s}"),
            other => write!(f, "{other}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationParams {
    #[serde(default)]
    pub subscription: String,
    #[serde(default)]
    pub result: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub params: NotificationParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RpcError> {
        serde_json::from_slice(bytes).map_err(|e| RpcError::decode(e.to_string()))
    }

    pub fn from_text(text: &str) -> Result<Self, RpcError> {
        Self::from_slice(text.as_bytes())
    }

    /// Notification payload (`params.result`).
    pub fn payload(&self) -> &Payload {
        &self.params.result
    }

    /// Subscription id from a handshake reply: top-level `result`, else `params.subscription`.
    pub fn subscription_id(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(Value::as_str)
            .or(Some(self.params.subscription.as_str()))
            .filter(|id| !id.is_empty())
    }

    /// Fail with [`RpcError::Rejected`] if the node returned an error object.
    #[track_caller]
    pub fn into_result(self) -> Result<Self, RpcError> {
        match self.error {
            Some(error) => Err(RpcError::Rejected {
                code: error.code,
                message: error.message,
                location: ErrorLocation::caller(),
            }),
            None => Ok(self),
        }
    }
}

/// Server-assigned id of an active push stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: String,
}

impl Subscription {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Interpretation of an `eth_syncing` result.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Synced,
    Syncing(Value),
}

impl SyncStatus {
    pub fn from_response(response: &RpcResponse) -> Self {
        match &response.result {
            None | Some(Value::Bool(false)) | Some(Value::Null) => SyncStatus::Synced,
            Some(progress) => SyncStatus::Syncing(progress.clone()),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Synced => write!(f, "synced"),
            SyncStatus::Syncing(progress) => write!(f, "syncing {progress}"),
        }
    }
}
