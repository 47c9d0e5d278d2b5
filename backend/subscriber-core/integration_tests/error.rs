use subscriber_core::error::{ConfigError, ConnectError, CoreError, RpcError, StreamError, TokenError};

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

/// **VALUE**: Verifies every error family carries its origin in the message.
///
/// **WHY THIS MATTERS**: The binary logs the error and exits. The `[file:line:col]`
/// suffix is the only pointer to which phase failed.
///
/// **BUG THIS CATCHES**: Would catch a variant whose `#[error]` format drops `{location}`.
#[test]
fn given_errors_from_each_phase_when_formatted_then_include_location() {
    let location = ErrorLocation::from(Location::caller());
    let errors: Vec<CoreError> = vec![
        ConfigError::Missing { name: "SECRET_KEY", location }.into(),
        TokenError::Decode { message: "bad hex".into(), location }.into(),
        TokenError::Signing { message: "empty".into(), location }.into(),
        ConnectError::Rejected { status_code: HttpStatusCode(401), location }.into(),
        RpcError::Decode { message: "eof".into(), location }.into(),
        StreamError::Closed { code: Some(1000), reason: "bye".into(), location }.into(),
    ];

    for err in errors {
        let rendered = err.to_string();
        assert!(rendered.contains("error.rs"), "missing location in: {rendered}");
    }
}

#[test]
fn given_config_error_helpers_when_formatted_then_name_the_variable() {
    let missing = ConfigError::missing("ETH_HOST").to_string();
    let invalid = ConfigError::invalid("WS_PORT", "'x': invalid digit").to_string();

    assert!(missing.contains("ETH_HOST is not set"));
    assert!(invalid.contains("WS_PORT: 'x': invalid digit"));
}

#[test]
fn given_stream_errors_when_classified_then_only_close_is_clean() {
    assert!(StreamError::closed(Some(1000), "bye").is_clean_close());
    assert!(!StreamError::read("reset").is_clean_close());
}
