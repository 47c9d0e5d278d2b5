use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use thiserror::Error as ThisError;
use tokio_tungstenite::tungstenite::Error as WsError;

/// Failures while opening the WebSocket. All of them end the run; there is no retry.
#[derive(Debug, ThisError)]
pub enum ConnectError {
    #[error("URL Error: {message} {location}")]
    Url {
        message: String,
        location: ErrorLocation,
    },

    #[error("Header Error: {message} {location}")]
    Header {
        message: String,
        location: ErrorLocation,
    },

    #[error("Handshake Error: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
    },

    #[error("Handshake Rejected: HTTP {status_code} {location}")]
    Rejected {
        status_code: HttpStatusCode,
        location: ErrorLocation,
    },

    #[error("Connect Timeout Error: no handshake after {timeout_secs}s {location}")]
    Timeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },
}

impl ConnectError {
    /// True when the node refused the bearer token (expired, wrong secret).
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ConnectError::Rejected { status_code, .. } if status_code.is_auth_rejection())
    }
}

impl From<url::ParseError> for ConnectError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        ConnectError::Url {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<WsError> for ConnectError {
    #[track_caller]
    fn from(error: WsError) -> Self {
        match error {
            WsError::Http(response) => ConnectError::Rejected {
                status_code: HttpStatusCode(response.status().as_u16()),
                location: ErrorLocation::from(Location::caller()),
            },
            other => ConnectError::Handshake {
                message: other.to_string(),
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }
}
