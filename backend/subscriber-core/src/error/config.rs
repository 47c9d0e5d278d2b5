use common::ErrorLocation;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config Missing Error: {name} is not set {location}")]
    Missing {
        name: &'static str,
        location: ErrorLocation,
    },

    #[error("Config Invalid Error: {name}: {reason} {location}")]
    Invalid {
        name: &'static str,
        reason: String,
        location: ErrorLocation,
    },
}

impl ConfigError {
    #[track_caller]
    pub fn missing(name: &'static str) -> Self {
        ConfigError::Missing {
            name,
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
            location: ErrorLocation::caller(),
        }
    }
}
