use common::ErrorLocation;

use subscriber_core::error::CoreError;

use thiserror::Error;

/// Errors that end the subscriber process with a non-zero exit code.
#[derive(Debug, Error)]
pub enum SubscriberError {
    /// Logger could not be set up
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// Any fatal phase of the protocol client
    #[error(transparent)]
    Core(#[from] CoreError),
}
