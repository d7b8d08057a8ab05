use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::error_codes;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    InvalidRpcVersion,
    ExecutionTimeout,
    Custom(i64),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::InvalidRpcVersion => error_codes::INVALID_RPC_VERSION,
            JsonRpcErrorCode::ExecutionTimeout => error_codes::EXECUTION_TIMEOUT,
            JsonRpcErrorCode::Custom(code) => *code,
        }
    }

    /// Canonical message for catalogued codes. Custom codes have none.
    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid method parameter(s)",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::InvalidRpcVersion => "JSON RPC Version must be 2.0",
            JsonRpcErrorCode::ExecutionTimeout => "Method execution timeout",
            JsonRpcErrorCode::Custom(_) => "",
        }
    }

    /// Map a raw numeric code back onto the catalogue
    pub fn from_code(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            error_codes::INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            error_codes::INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            error_codes::INVALID_RPC_VERSION => JsonRpcErrorCode::InvalidRpcVersion,
            error_codes::EXECUTION_TIMEOUT => JsonRpcErrorCode::ExecutionTimeout,
            other => JsonRpcErrorCode::Custom(other),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    /// Build an error with the canonical message for `code` and optional diagnostic data
    pub fn new(code: JsonRpcErrorCode, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data,
        }
    }

    /// Caller-supplied code and message, no diagnostic data
    pub fn custom(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn error_code(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }

    pub fn parse_error(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, Some(data.into()))
    }

    pub fn invalid_request(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, Some(data.into()))
    }

    pub fn method_not_found(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound, Some(data.into()))
    }

    pub fn invalid_params(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, Some(data.into()))
    }

    pub fn internal_error(data: impl Into<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, Some(data.into()))
    }

    pub fn invalid_rpc_version(version: &str) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRpcVersion, Some(Value::from(version)))
    }

    pub fn execution_timeout() -> Self {
        Self::new(JsonRpcErrorCode::ExecutionTimeout, None)
    }
}

impl fmt::Display for JsonRpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(
                f,
                "jsonrpc: {{ code: {}, message: {}, data: {} }}",
                self.code, self.message, data
            ),
            None => write!(
                f,
                "jsonrpc: {{ code: {}, message: {} }}",
                self.code, self.message
            ),
        }
    }
}

impl std::error::Error for JsonRpcErrorObject {}

/// Failures that abort a whole `handle` call. No wire response is produced
/// for these; the caller decides how to surface them.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Rpc(#[from] JsonRpcErrorObject),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Response encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DispatchError {
    /// Protocol error object describing this failure
    pub fn error_object(&self) -> JsonRpcErrorObject {
        match self {
            DispatchError::Rpc(error) => error.clone(),
            DispatchError::Io(err) => JsonRpcErrorObject::internal_error(err.to_string()),
            DispatchError::Encode(err) => JsonRpcErrorObject::internal_error(err.to_string()),
        }
    }
}

/// Method registration misconfiguration, reported by `MethodRegistryBuilder::build`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("jsonrpc: method name should not be empty")]
    EmptyMethodName,
}
