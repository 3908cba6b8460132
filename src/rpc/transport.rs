//! The request/response seam to the node.
//!
//! Everything above this layer is transport-agnostic: the node client and
//! the filter manager only see [`Transport`]. Production uses
//! [`HttpTransport`]; tests use the scripted transport from `testkit`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::error::RpcError;

/// An asynchronous JSON-RPC request channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single request and return the `result` member of the
    /// response envelope.
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        (**self).request(method, params).await
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport pointed at the node's RPC endpoint.
    pub fn new(url: &str) -> crate::error::Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(url)?,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        trace!(id, method, "sending JSON-RPC request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }
        Ok(envelope.result.unwrap_or(Value::Null))
    }
}
