use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures of a single request/response exchange.
#[derive(Debug, ThisError)]
pub enum RpcError {
    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },

    #[error("Response Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connection Closed before reply to '{method}' {location}")]
    Closed {
        method: String,
        location: ErrorLocation,
    },

    #[error("Request Timeout Error: no reply to '{method}' after {timeout_secs}s {location}")]
    Timeout {
        method: String,
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Request Rejected: {code} - {message} {location}")]
    Rejected {
        code: i64,
        message: String,
        location: ErrorLocation,
    },

    #[error("Handshake Error: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
    },

    #[error("HTTP Error: HTTP {status_code} - {message} {location}")]
    Http {
        status_code: HttpStatusCode,
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport Error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },
}

impl RpcError {
    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        RpcError::Decode {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn closed(method: impl Into<String>) -> Self {
        RpcError::Closed {
            method: method.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn handshake(message: impl Into<String>) -> Self {
        RpcError::Handshake {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<reqwest::Error> for RpcError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return RpcError::Http {
                status_code: HttpStatusCode(status.as_u16()),
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        RpcError::Transport {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
