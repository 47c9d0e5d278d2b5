mod connection;
mod error;
mod helpers;
mod rpc;
mod subscriber;
mod sync_status;
