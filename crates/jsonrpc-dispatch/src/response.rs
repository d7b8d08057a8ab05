use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcErrorObject;
use crate::request::JsonRpcRequest;
use crate::types::RequestId;

/// A JSON-RPC response.
///
/// `id` is always present on the wire (`null` when the call had none).
/// At most one of `result` and `error` is set; `set_error` drops any result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: String,
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    /// Empty response echoing the version and id of `request`
    pub fn for_request(request: &JsonRpcRequest) -> Self {
        Self {
            version: request.version.clone(),
            id: request.id.clone(),
            result: None,
            error: None,
        }
    }

    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            version: crate::JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: crate::JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn set_result(&mut self, result: Value) {
        self.result = Some(result);
    }

    /// Set the error, discarding any result set earlier.
    pub fn set_error(&mut self, error: JsonRpcErrorObject) {
        self.result = None;
        self.error = Some(error);
    }

    pub fn with_error(mut self, error: JsonRpcErrorObject) -> Self {
        self.set_error(error);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_string};

    #[test]
    fn test_response_serialization() {
        let response = JsonRpcResponse::success(Some(RequestId::from("1")), json!(130));
        let json_str = to_string(&response).unwrap();
        assert_eq!(json_str, r#"{"jsonrpc":"2.0","id":"1","result":130}"#);

        let parsed: JsonRpcResponse = from_str(&json_str).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn test_missing_id_serializes_as_null() {
        let response = JsonRpcResponse::error(None, JsonRpcErrorObject::execution_timeout());
        let json_str = to_string(&response).unwrap();
        assert_eq!(
            json_str,
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32002,"message":"Method execution timeout"}}"#
        );
    }

    #[test]
    fn test_echoes_request_version_and_id() {
        let mut request = JsonRpcRequest::new(7i64, "x", None);
        request.version = "1.0".to_string();
        let response = JsonRpcResponse::for_request(&request);
        assert_eq!(response.version, "1.0");
        assert_eq!(response.id, Some(RequestId::from(7i64)));
    }

    #[test]
    fn test_error_discards_result() {
        let mut response = JsonRpcResponse::success(Some(RequestId::from(1i64)), json!(1));
        response.set_error(JsonRpcErrorObject::custom(1, "Fake error for test"));
        assert!(response.result.is_none());
        assert_eq!(
            to_string(&response).unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":1,"message":"Fake error for test"}}"#
        );
    }
}
