use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::JsonRpcErrorObject;
use crate::request::JsonRpcRequest;

/// Outcome of a handler: the `result` member on success, the `error` member otherwise
pub type HandlerResult = Result<Value, JsonRpcErrorObject>;

/// Trait for handling JSON-RPC method calls
///
/// The request carries a [`CallContext`](crate::CallContext) bounded by the
/// registry timeout. Once it expires the response has already been written
/// without this handler's output, so long-running handlers should watch
/// `request.context().cancelled()`.
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    async fn handle(&self, request: JsonRpcRequest) -> HandlerResult;
}

/// A simple function-based handler
pub struct FunctionHandler<F, Fut> {
    handler_fn: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FunctionHandler<F, Fut>
where
    F: Fn(JsonRpcRequest) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    pub fn new(handler_fn: F) -> Self {
        Self {
            handler_fn,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut> JsonRpcHandler for FunctionHandler<F, Fut>
where
    F: Fn(JsonRpcRequest) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, request: JsonRpcRequest) -> HandlerResult {
        (self.handler_fn)(request).await
    }
}
