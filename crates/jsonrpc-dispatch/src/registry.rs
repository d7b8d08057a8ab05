//! Immutable name → handler method table built once at startup.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::handler::{FunctionHandler, HandlerResult, JsonRpcHandler};
use crate::request::JsonRpcRequest;

/// Builder for [`MethodRegistry`]
///
/// Registration is configuration, not runtime input: an invalid entry is
/// remembered and reported by [`build`](Self::build).
pub struct MethodRegistryBuilder {
    timeout: Duration,
    methods: HashMap<String, Arc<dyn JsonRpcHandler>>,
    error: Option<RegistryError>,
}

impl MethodRegistryBuilder {
    pub fn new() -> Self {
        Self {
            timeout: crate::DEFAULT_TIMEOUT,
            methods: HashMap::new(),
            error: None,
        }
    }

    /// Per-call execution timeout (default 10 seconds)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a handler. Registering the same name twice keeps the last handler.
    pub fn method<H>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: JsonRpcHandler + 'static,
    {
        self.method_arc(name, Arc::new(handler))
    }

    /// Register an already shared handler, e.g. one serving several methods
    pub fn method_arc(mut self, name: impl Into<String>, handler: Arc<dyn JsonRpcHandler>) -> Self {
        let name = name.into();
        if name.is_empty() {
            warn!("Rejected registration with an empty method name");
            self.error = Some(RegistryError::EmptyMethodName);
            return self;
        }
        if self.methods.insert(name.clone(), handler).is_some() {
            debug!("Method '{}' registered again, replacing previous handler", name);
        }
        self
    }

    /// Register an async closure as a handler
    pub fn method_fn<F, Fut>(self, name: impl Into<String>, handler_fn: F) -> Self
    where
        F: Fn(JsonRpcRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.method(name, FunctionHandler::new(handler_fn))
    }

    /// Freeze the registrations and timeout
    pub fn build(self) -> Result<MethodRegistry, RegistryError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        debug!(
            "Built method registry: {} method(s), timeout {:?}",
            self.methods.len(),
            self.timeout
        );
        Ok(MethodRegistry {
            methods: self.methods,
            timeout: self.timeout,
        })
    }
}

impl Default for MethodRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only method table shared by every in-flight call
pub struct MethodRegistry {
    methods: HashMap<String, Arc<dyn JsonRpcHandler>>,
    timeout: Duration,
}

impl MethodRegistry {
    pub fn builder() -> MethodRegistryBuilder {
        MethodRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn JsonRpcHandler>> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.methods())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_timeout() {
        let registry = MethodRegistry::builder().build().unwrap();
        assert_eq!(registry.timeout(), Duration::from_secs(10));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = MethodRegistry::builder()
            .timeout(Duration::from_secs(2))
            .method_fn("add", |_req| async { Ok(json!(1)) })
            .method_fn("sum", |_req| async { Ok(json!(2)) })
            .build()
            .unwrap();

        assert_eq!(registry.timeout(), Duration::from_secs(2));
        assert_eq!(registry.methods(), vec!["add".to_string(), "sum".to_string()]);
        assert!(registry.contains("add"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_empty_name_fails_build() {
        let result = MethodRegistry::builder()
            .method_fn("", |_req| async { Ok(json!(null)) })
            .method_fn("add", |_req| async { Ok(json!(1)) })
            .build();
        assert_eq!(result.unwrap_err(), RegistryError::EmptyMethodName);
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let registry = MethodRegistry::builder()
            .method_fn("add", |_req| async { Ok(json!("first")) })
            .method_fn("add", |_req| async { Ok(json!("second")) })
            .build()
            .unwrap();

        assert_eq!(registry.len(), 1);
        let handler = registry.get("add").unwrap();
        let result = handler.handle(JsonRpcRequest::new(1i64, "add", None)).await;
        assert_eq!(result.unwrap(), json!("second"));
    }
}
