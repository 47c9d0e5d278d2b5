//! JSON-RPC over the subscriber's two transports.
//!
//! - [`call`]/[`subscribe`]: one request, exactly one reply, on the WebSocket
//! - [`HttpRpcClient`]: the `eth_syncing` pre-flight check over plain HTTP
//!
//! Only one request is ever in flight. `call` holds `&mut` on the connection
//! until its reply is read, so a second request cannot be pipelined.

mod call;
mod envelope;
mod http;

pub use call::{SUBSCRIBE_REQUEST_ID, call, subscribe};
pub use envelope::{
    NotificationParams, Payload, RpcErrorObject, RpcRequest, RpcResponse, Subscription,
    SyncStatus,
};
pub use http::HttpRpcClient;
