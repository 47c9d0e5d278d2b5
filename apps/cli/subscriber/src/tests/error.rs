// Unit tests for the binary's error type

use crate::error::SubscriberError;

use subscriber_core::error::{CoreError, TokenError};

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies core errors pass through with their own message and location.
///
/// **WHY THIS MATTERS**: main() logs `SubscriberError` with `{}`. The transparent wrapper
/// must not hide which phase failed.
///
/// **BUG THIS CATCHES**: Would catch replacing `#[error(transparent)]` with a generic text.
#[test]
fn given_core_error_when_wrapped_then_message_is_preserved() {
    let core: CoreError = TokenError::Decode {
        message: String::from("secret is not valid hex"),
        location: ErrorLocation::from(Location::caller()),
    }
    .into();

    let err = SubscriberError::from(core);

    let rendered = err.to_string();
    assert!(rendered.starts_with("Secret Decode Error: secret is not valid hex"));
    assert!(rendered.contains("error.rs"));
}
