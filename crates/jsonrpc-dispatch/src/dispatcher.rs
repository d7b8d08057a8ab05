//! Dispatcher: decode, route, run under a deadline, encode.

use std::sync::Arc;

use futures::future::join_all;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use crate::context::CallContext;
use crate::decode::{decode_requests, decode_requests_from_slice};
use crate::error::{DispatchError, JsonRpcErrorObject};
use crate::registry::MethodRegistry;
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcResponse;

/// JSON-RPC dispatcher over an immutable [`MethodRegistry`].
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
}

impl Dispatcher {
    pub fn new(registry: MethodRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    pub fn from_shared(registry: Arc<MethodRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Read one request or batch from `source`, run it, and write the reply to `sink`.
    ///
    /// Nothing is written when every call was a successful notification.
    /// Decode failures and an empty batch are returned as errors without
    /// touching `sink`; per-call failures are encoded as error responses.
    pub async fn handle<R, W>(
        &self,
        ctx: &CallContext,
        source: R,
        mut sink: W,
    ) -> Result<(), DispatchError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let requests = decode_requests(source).await?;
        let responses = self.dispatch(ctx, requests).await?;

        if let Some(payload) = encode_responses(&responses)? {
            sink.write_all(&payload).await?;
            sink.flush().await?;
        }
        Ok(())
    }

    /// In-memory variant of [`handle`](Self::handle). Returns an empty vector
    /// when there is nothing to send.
    pub async fn handle_bytes(
        &self,
        ctx: &CallContext,
        body: &[u8],
    ) -> Result<Vec<u8>, DispatchError> {
        let requests = decode_requests_from_slice(body)?;
        let responses = self.dispatch(ctx, requests).await?;
        Ok(encode_responses(&responses)?.unwrap_or_default())
    }

    /// Run already decoded calls and keep the responses that must be sent,
    /// in request order.
    ///
    /// A response is kept when its call had an id or when it carries an
    /// error. Failed notifications are reported so the client can learn
    /// about them.
    pub async fn dispatch(
        &self,
        ctx: &CallContext,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, DispatchError> {
        if requests.is_empty() {
            return Err(JsonRpcErrorObject::invalid_request("no methods specified").into());
        }

        let responses = join_all(requests.iter().map(|request| self.execute(ctx, request))).await;

        Ok(requests
            .iter()
            .zip(responses)
            .filter(|(request, response)| !request.is_notification() || response.is_error())
            .map(|(_, response)| response)
            .collect())
    }

    /// Run a single call: version check, method lookup, timed execution.
    pub async fn execute(&self, ctx: &CallContext, request: &JsonRpcRequest) -> JsonRpcResponse {
        let mut response = JsonRpcResponse::for_request(request);

        if request.version != crate::JSONRPC_VERSION {
            debug!("Rejected call with jsonrpc version '{}'", request.version);
            return response.with_error(JsonRpcErrorObject::invalid_rpc_version(&request.version));
        }

        if request.method.is_empty() {
            return response
                .with_error(JsonRpcErrorObject::method_not_found("Method not specified or empty"));
        }

        let Some(handler) = self.registry.get(&request.method) else {
            warn!("Method not found: {}", request.method);
            return response.with_error(JsonRpcErrorObject::method_not_found(request.method.as_str()));
        };

        let call_ctx = ctx.child(self.registry.timeout());
        let call = request.with_context(call_ctx.clone());
        let handler = Arc::clone(handler);

        debug!("Dispatching '{}' (id: {:?})", request.method, request.id);

        // Dropping the handle on timeout detaches the task; it is never aborted.
        let mut task = tokio::spawn(async move { handler.handle(call).await });

        tokio::select! {
            biased;
            joined = &mut task => match joined {
                Ok(Ok(result)) => response.set_result(result),
                Ok(Err(err)) => {
                    debug!("Method '{}' returned error {}", request.method, err.code);
                    response.set_error(err);
                }
                Err(join_error) => {
                    error!("Method '{}' failed: {}", request.method, join_error);
                    response.set_error(JsonRpcErrorObject::internal_error(join_failure(join_error)));
                }
            },
            _ = call_ctx.done() => {
                warn!(
                    "Method '{}' did not finish within {:?}",
                    request.method,
                    self.registry.timeout()
                );
                response.set_error(JsonRpcErrorObject::execution_timeout());
            }
        }

        call_ctx.cancel();
        response
    }
}

/// One response encodes as an object, several as an array, none as nothing.
fn encode_responses(responses: &[JsonRpcResponse]) -> Result<Option<Vec<u8>>, serde_json::Error> {
    let mut payload = match responses {
        [] => return Ok(None),
        [single] => serde_json::to_vec(single)?,
        many => serde_json::to_vec(many)?,
    };
    payload.push(b'\n');
    Ok(Some(payload))
}

fn join_failure(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
