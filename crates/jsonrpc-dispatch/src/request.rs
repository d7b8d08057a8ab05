use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::CallContext;
use crate::error::JsonRpcErrorObject;
use crate::types::RequestId;

/// A JSON-RPC call as received on the wire.
///
/// `jsonrpc` and `method` default to empty strings when missing so the
/// dispatcher can report them per call instead of failing the whole batch.
/// A call without an `id` is a notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc", default)]
    pub version: String,
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip)]
    context: Option<CallContext>,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            version: crate::JSONRPC_VERSION.to_string(),
            method: method.into(),
            id: Some(id.into()),
            params,
            context: None,
        }
    }

    /// Create a call without an id
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            version: crate::JSONRPC_VERSION.to_string(),
            method: method.into(),
            id: None,
            params,
            context: None,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Decode the params into `T`.
    ///
    /// Missing params or a shape mismatch are reported as `InvalidParams`.
    pub fn parse_params<T: DeserializeOwned>(&self) -> Result<T, JsonRpcErrorObject> {
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| JsonRpcErrorObject::invalid_params("request doesn't have params"))?;
        T::deserialize(params).map_err(|err| JsonRpcErrorObject::invalid_params(err.to_string()))
    }

    /// The attached call context, or a background context when none was attached.
    pub fn context(&self) -> CallContext {
        self.context.clone().unwrap_or_default()
    }

    /// Shallow copy of this request carrying `ctx`.
    pub fn with_context(&self, ctx: CallContext) -> Self {
        Self {
            context: Some(ctx),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_string};

    #[derive(Debug, Deserialize)]
    struct AddParams {
        v1: i64,
        v2: i64,
    }

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new(1i64, "test_method", None);

        let json = to_string(&request).unwrap();
        assert_eq!(json, r#"{"jsonrpc":"2.0","method":"test_method","id":1}"#);

        let parsed: JsonRpcRequest = from_str(&json).unwrap();
        assert_eq!(parsed.id, Some(RequestId::from(1i64)));
        assert_eq!(parsed.method, "test_method");
        assert!(parsed.params.is_none());
    }

    #[test]
    fn test_missing_members_default_to_empty() {
        let parsed: JsonRpcRequest = from_str("{}").unwrap();
        assert_eq!(parsed.version, "");
        assert_eq!(parsed.method, "");
        assert!(parsed.is_notification());
    }

    #[test]
    fn test_null_id_is_notification() {
        let parsed: JsonRpcRequest =
            from_str(r#"{"jsonrpc":"2.0","method":"ping","id":null}"#).unwrap();
        assert!(parsed.is_notification());
    }

    #[test]
    fn test_parse_params() {
        let request = JsonRpcRequest::new("1", "add", Some(json!({"v1": 10, "v2": 120})));
        let params: AddParams = request.parse_params().unwrap();
        assert_eq!(params.v1 + params.v2, 130);
    }

    #[test]
    fn test_parse_params_missing() {
        let request = JsonRpcRequest::new("1", "add", None);
        let err = request.parse_params::<AddParams>().unwrap_err();
        assert_eq!(err.code, -32602);
        assert_eq!(err.data, Some(json!("request doesn't have params")));
    }

    #[test]
    fn test_parse_params_wrong_shape() {
        let request = JsonRpcRequest::new("1", "add", Some(json!({"v1": "ten"})));
        let err = request.parse_params::<AddParams>().unwrap_err();
        assert_eq!(err.code, -32602);
        assert!(err.data.is_some());
    }

    #[tokio::test]
    async fn test_with_context_copies() {
        let request = JsonRpcRequest::new(1i64, "ping", None);
        assert!(request.context().deadline().is_none());

        let ctx = CallContext::with_timeout(std::time::Duration::from_secs(5));
        let attached = request.with_context(ctx.clone());
        assert_eq!(attached.context().deadline(), ctx.deadline());
        assert!(request.context().deadline().is_none());
        assert_eq!(attached.method, request.method);
    }
}
