use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures while turning the shared secret into a signed credential.
///
/// Neither variant is retryable: a bad secret never starts working.
#[derive(Debug, ThisError)]
pub enum TokenError {
    #[error("Secret Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Token Signing Error: {message} {location}")]
    Signing {
        message: String,
        location: ErrorLocation,
    },
}

impl TokenError {
    #[track_caller]
    pub fn signing(message: impl Into<String>) -> Self {
        TokenError::Signing {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<hex::FromHexError> for TokenError {
    #[track_caller]
    fn from(error: hex::FromHexError) -> Self {
        TokenError::Decode {
            message: format!("secret is not valid hex: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    #[track_caller]
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        TokenError::Signing {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
