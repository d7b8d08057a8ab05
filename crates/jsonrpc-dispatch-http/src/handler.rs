//! HTTP request handler mediating between hyper and the dispatcher

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, error, warn};

use jsonrpc_dispatch::{CallContext, Dispatcher};

use crate::{CorsLayer, ServerConfig};

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP handler for JSON-RPC requests
#[derive(Clone)]
pub struct RpcHttpHandler {
    config: Arc<ServerConfig>,
    dispatcher: Dispatcher,
}

impl RpcHttpHandler {
    pub fn new(config: Arc<ServerConfig>, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Handle one HTTP request. Never fails: every outcome maps to a status code.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let mut response = self.route(req).await;
        if self.config.enable_cors {
            CorsLayer::apply_cors_headers(response.headers_mut());
        }
        response
    }

    async fn route<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        debug!("Handling {} {}", req.method(), req.uri().path());

        if req.uri().path() != self.config.rpc_path {
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        match *req.method() {
            Method::POST => self.handle_json_rpc_request(req).await,
            Method::OPTIONS => empty_response(StatusCode::NO_CONTENT),
            _ => {
                let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
                response
                    .headers_mut()
                    .insert(ALLOW, HeaderValue::from_static("POST, OPTIONS"));
                response
            }
        }
    }

    /// Handle JSON-RPC requests over HTTP POST
    async fn handle_json_rpc_request<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with(JSON_CONTENT_TYPE) {
            warn!("Invalid content type: {}", content_type);
            return empty_response(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        }

        let body = match Limited::new(req.into_body(), self.config.max_body_size)
            .collect()
            .await
        {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                warn!("Request body larger than {} bytes", self.config.max_body_size);
                return text_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
            }
            Err(err) => {
                error!("Failed to read request body: {}", err);
                return text_response(StatusCode::BAD_REQUEST, "Failed to read request body");
            }
        };

        if body.is_empty() {
            return empty_response(StatusCode::NO_CONTENT);
        }

        // Cancelled when hyper drops this future, e.g. on client disconnect
        let ctx = CallContext::background();
        let _guard = ctx.cancel_on_drop();

        match self.dispatcher.handle_bytes(&ctx, &body).await {
            Ok(reply) => {
                let mut response = Response::new(Full::new(Bytes::from(reply)));
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                response
            }
            Err(err) => {
                warn!("JSON-RPC request rejected: {}", err);
                // Same content type as a reply; the body is the error text
                let mut response = Response::new(Full::new(Bytes::from(err.to_string())));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                response
            }
        }
    }
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}
