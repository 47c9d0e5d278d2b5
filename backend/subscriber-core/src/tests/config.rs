// Unit tests for configuration loading

use crate::config::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_WS_PORT, SubscriberConfig};
use crate::error::ConfigError;

use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

/// **VALUE**: Verifies required variables produce a config with defaults for the rest.
///
/// **BUG THIS CATCHES**: Would catch defaults drifting from 8546 / 30s / newPendingTransactions.
#[test]
fn given_required_vars_when_loaded_then_defaults_fill_the_rest() {
    let config =
        SubscriberConfig::from_lookup(lookup(&[("SECRET_KEY", "deadbeef"), ("ETH_HOST", "node")]))
            .expect("config should load");

    assert_eq!(config.secret.expose(), "deadbeef");
    assert_eq!(config.host, "node");
    assert_eq!(config.ws_port, DEFAULT_WS_PORT);
    assert_eq!(config.rpc_port, None);
    assert_eq!(config.topic, "newPendingTransactions");
    assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}

/// **VALUE**: Verifies a missing or blank secret/host is reported by name.
///
/// **WHY THIS MATTERS**: The process must exit immediately with a clear message rather
/// than trying to connect to an empty host.
///
/// **BUG THIS CATCHES**: Would catch treating an empty env var as present.
#[test]
fn given_missing_required_vars_when_loaded_then_returns_missing_error() {
    let no_secret = SubscriberConfig::from_lookup(lookup(&[("ETH_HOST", "node")]));
    let blank_host =
        SubscriberConfig::from_lookup(lookup(&[("SECRET_KEY", "deadbeef"), ("ETH_HOST", "  ")]));

    assert!(matches!(no_secret, Err(ConfigError::Missing { name: "SECRET_KEY", .. })));
    assert!(matches!(blank_host, Err(ConfigError::Missing { name: "ETH_HOST", .. })));
}

#[test]
fn given_optional_vars_when_loaded_then_overrides_apply() {
    let config = SubscriberConfig::from_lookup(lookup(&[
        ("SECRET_KEY", "deadbeef"),
        ("ETH_HOST", "127.0.0.1"),
        ("WS_PORT", "9000"),
        ("RPC_PORT", "9001"),
        ("SUBSCRIPTION_TOPIC", "newHeads"),
        ("REQUEST_TIMEOUT_SECS", "5"),
    ]))
    .unwrap();

    assert_eq!(config.ws_port, 9000);
    assert_eq!(config.rpc_port, Some(9001));
    assert_eq!(config.topic, "newHeads");
    assert_eq!(config.request_timeout, Duration::from_secs(5));
}

/// **VALUE**: Verifies unparseable ports and a zero timeout are rejected.
///
/// **BUG THIS CATCHES**: Would catch silently falling back to defaults on typos.
#[test]
fn given_invalid_optional_vars_when_loaded_then_returns_invalid_error() {
    let base = [("SECRET_KEY", "deadbeef"), ("ETH_HOST", "node")];

    for (name, value) in [
        ("WS_PORT", "eighty"),
        ("RPC_PORT", "70000"),
        ("REQUEST_TIMEOUT_SECS", "0"),
    ] {
        let mut vars = base.to_vec();
        vars.push((name, value));

        let result = SubscriberConfig::from_lookup(lookup(&vars));

        match result {
            Err(ConfigError::Invalid { name: reported, .. }) => assert_eq!(reported, name),
            other => panic!("{name}={value} should be invalid, got {other:?}"),
        }
    }
}

#[test]
fn given_config_when_debug_formatted_then_secret_is_redacted() {
    let config =
        SubscriberConfig::from_lookup(lookup(&[("SECRET_KEY", "deadbeef"), ("ETH_HOST", "node")]))
            .unwrap();

    assert!(!format!("{config:?}").contains("deadbeef"));
}
