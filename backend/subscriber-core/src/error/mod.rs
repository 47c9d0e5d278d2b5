pub mod config;
pub mod connect;
pub mod rpc;
pub mod stream;
pub mod token;

pub use config::ConfigError;
pub use connect::ConnectError;
pub use rpc::RpcError;
pub use stream::StreamError;
pub use token::TokenError;

use thiserror::Error;

/// Any fatal failure of a subscriber run.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}
