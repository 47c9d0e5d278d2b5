use common::ErrorLocation;

use thiserror::Error as ThisError;

/// The disconnect signal that ends a notification stream.
///
/// Exactly one of these is yielded as the final item; the stream is fused afterwards.
#[derive(Debug, ThisError)]
pub enum StreamError {
    #[error("Stream Closed: {reason} {location}")]
    Closed {
        code: Option<u16>,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Stream Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },
}

impl StreamError {
    #[track_caller]
    pub fn closed(code: Option<u16>, reason: impl Into<String>) -> Self {
        StreamError::Closed {
            code,
            reason: reason.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn read(message: impl Into<String>) -> Self {
        StreamError::Read {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    /// A remote close rather than a transport failure.
    pub fn is_clean_close(&self) -> bool {
        matches!(self, StreamError::Closed { .. })
    }
}
