pub mod auth;
pub mod config;
pub mod connection;
pub mod error;
pub mod notifications;
pub mod rpc;
pub mod subscriber;

#[cfg(test)]
mod tests;

pub const JSONRPC_VERSION: &str = "2.0";
pub const JSONRPC_SUBPROTOCOL: &str = "jsonrpc";
pub const SUBSCRIBE_METHOD: &str = "eth_subscribe";
pub const SYNCING_METHOD: &str = "eth_syncing";
pub const NEW_PENDING_TRANSACTIONS: &str = "newPendingTransactions";
pub const BEARER_PREFIX: &str = "Bearer ";
pub const WS_SCHEME: &str = "ws";
pub const HTTP_SCHEME: &str = "http";
pub const WS_URL_PREFIX: &str = const_format::concatcp!(WS_SCHEME, "://");
pub const HTTP_URL_PREFIX: &str = const_format::concatcp!(HTTP_SCHEME, "://");
