use thiserror::Error;

use crate::domain::error::DecodeError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the remote JSON-RPC node.
#[derive(Error, Debug, Clone)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("node returned error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("empty response")]
    Empty,
}

/// Errors from the price-event filter manager.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The remote service returned the sentinel empty value instead of a
    /// real filter handle.
    #[error("node returned an empty handle for {topic} filter")]
    InvalidHandle { topic: &'static str },

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Transaction lifecycle errors.
#[derive(Error, Debug)]
pub enum TxError {
    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("transaction {tx_hash} not confirmed after {waited_secs}s")]
    ConfirmationTimeout { tx_hash: String, waited_secs: u64 },

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Contract wrapper errors.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("no address registered for contract '{name}'")]
    UnknownContract { name: String },

    #[error("invalid address for contract '{name}': {reason}")]
    InvalidAddress { name: String, reason: String },

    #[error("name '{name}' does not fit in 32 bytes")]
    NameTooLong { name: String },

    #[error("unexpected return data: {0}")]
    BadReturn(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Tx(#[from] TxError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("node process error: {0}")]
    NodeProcess(String),
}

pub type Result<T> = std::result::Result<T, Error>;
