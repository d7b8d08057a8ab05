//! # JSON-RPC 2.0 Dispatcher
//!
//! A transport-agnostic JSON-RPC 2.0 dispatch engine. Raw bytes go in, one or
//! many calls are decoded, each call is routed to a registered handler and run
//! under a per-call deadline, and the aggregate response is written back out.
//!
//! ## Features
//! - Single and batch requests, with batch-vs-single response encoding
//! - Notifications (calls without an `id`) are only answered when they fail
//! - Immutable method registry built through a validating builder
//! - Per-call execution timeout with cooperative cancellation
//! - Works with any `AsyncRead` source and `AsyncWrite` sink
//!
//! ```rust,no_run
//! use jsonrpc_dispatch::prelude::*;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = MethodRegistry::builder()
//!     .method_fn("ping", |_req| async { Ok(json!("pong")) })
//!     .build()?;
//! let dispatcher = Dispatcher::new(registry);
//!
//! let input = br#"{"jsonrpc":"2.0","method":"ping","id":1}"#;
//! let mut output = Vec::new();
//! dispatcher
//!     .handle(&CallContext::background(), &input[..], &mut output)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod decode;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod response;
pub mod stdio;
pub mod types;

// Re-export main types
pub use context::{CallContext, CancelGuard};
pub use decode::{decode_requests, decode_requests_from_slice};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, JsonRpcErrorCode, JsonRpcErrorObject, RegistryError};
pub use handler::{FunctionHandler, HandlerResult, JsonRpcHandler};
pub use registry::{MethodRegistry, MethodRegistryBuilder};
pub use request::JsonRpcRequest;
pub use response::JsonRpcResponse;
pub use types::RequestId;

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Default per-call execution deadline
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Custom codes from the server error range
    pub const INVALID_RPC_VERSION: i64 = -32001;
    pub const EXECUTION_TIMEOUT: i64 = -32002;
}
