//! # HTTP adapter for jsonrpc-dispatch
//!
//! Serves a [`Dispatcher`] over HTTP/1.1 with hyper. Each POST body is handed
//! to the dispatcher as one request or batch; the encoded reply becomes the
//! response body.
//!
//! ## Status mapping
//! - `415` when `Content-Type` is not `application/json`
//! - `204` for an empty body
//! - `413` when the body exceeds the configured limit
//! - `200` with the JSON reply (empty when only notifications succeeded)
//! - `500` with the error text (still `application/json`) when no JSON-RPC
//!   reply could be produced

pub mod cors;
pub mod handler;
pub mod server;

#[cfg(test)]
mod tests;

// Re-export main types
pub use cors::CorsLayer;
pub use handler::RpcHttpHandler;
pub use server::{HttpRpcServer, HttpRpcServerBuilder, ServerConfig};

// Re-export foundational types
pub use jsonrpc_dispatch::{CallContext, Dispatcher, MethodRegistry};

/// Result type for HTTP RPC operations
pub type Result<T> = std::result::Result<T, HttpRpcError>;

/// HTTP adapter errors
#[derive(Debug, thiserror::Error)]
pub enum HttpRpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
