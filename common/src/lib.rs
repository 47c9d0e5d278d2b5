//! Shared building blocks for the subscriber workspace.
//!
//! Nothing in here knows about WebSockets or JSON-RPC. These are the
//! small utilities every other crate leans on:
//!
//! - [`ErrorLocation`]: file/line/column captured via `#[track_caller]`
//! - [`RedactedSecret`]: secret material that never shows up in logs
//! - [`HttpStatusCode`]: status codes kept as data for error categorization
//!
//! ## Architecture
//!
//! - **common** (this crate): Cross-cutting utilities
//! - **subscriber-core**: Protocol client (token, connection, rpc, notifications)
//! - **subscriber**: Binary wiring config, logging and the run loop together

pub mod error;
pub mod http_status;
pub mod redacted_secret;


pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;
