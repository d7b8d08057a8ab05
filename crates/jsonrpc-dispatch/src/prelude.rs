//! # JSON-RPC Dispatcher Prelude
//!
//! Convenient re-exports of the most commonly used types.
//!
//! ```rust
//! use jsonrpc_dispatch::prelude::*;
//! ```

pub use crate::context::{CallContext, CancelGuard};
pub use crate::dispatcher::Dispatcher;
pub use crate::error::{DispatchError, JsonRpcErrorCode, JsonRpcErrorObject, RegistryError};
pub use crate::handler::{FunctionHandler, HandlerResult, JsonRpcHandler};
pub use crate::registry::{MethodRegistry, MethodRegistryBuilder};
pub use crate::request::JsonRpcRequest;
pub use crate::response::JsonRpcResponse;
pub use crate::types::RequestId;

// Standard error codes
pub use crate::error_codes::*;
