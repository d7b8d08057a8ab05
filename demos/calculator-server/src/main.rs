//! # Calculator JSON-RPC Server
//!
//! Registers `add` and `sum` and serves them over stdin/stdout or HTTP.
//!
//! ## Usage
//! ```bash
//! # One request per line on stdin
//! echo '{"jsonrpc":"2.0","method":"add","params":{"value1":2,"value2":3},"id":1}' \
//!   | cargo run --package calculator-server
//!
//! # HTTP on 127.0.0.1:8000/rpc
//! cargo run --package calculator-server -- --transport http
//! curl -X POST http://127.0.0.1:8000/rpc \
//!   -H "Content-Type: application/json" \
//!   -d '[{"jsonrpc":"2.0","method":"add","params":{"value1":1,"value2":2},"id":"a"},
//!        {"jsonrpc":"2.0","method":"sum","params":{"value1":10,"value2":10},"id":"b"}]'
//! ```
//!
//! A sum of exactly 20 sleeps past the deadline to show the timeout error.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use serde_json::json;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use jsonrpc_dispatch::prelude::*;
use jsonrpc_dispatch::stdio::serve_lines;
use jsonrpc_dispatch_http::HttpRpcServer;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transport to serve on
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Bind address for the HTTP transport
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Per-call execution timeout in seconds
    #[arg(long, default_value = "2")]
    timeout_secs: u64,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Deserialize)]
struct Operands {
    value1: i64,
    value2: i64,
}

async fn add(req: JsonRpcRequest) -> HandlerResult {
    let ops: Operands = req.parse_params()?;
    let total = ops
        .value1
        .checked_add(ops.value2)
        .ok_or_else(|| JsonRpcErrorObject::invalid_params("integer overflow"))?;

    if total == 20 {
        tokio::time::sleep(Duration::from_secs(10)).await;
    }
    Ok(json!(total))
}

fn build_dispatcher(timeout: Duration) -> Result<Dispatcher> {
    let registry = MethodRegistry::builder()
        .timeout(timeout)
        .method_fn("add", add)
        .method_fn("sum", add)
        .build()
        .context("invalid method registry")?;
    info!("Registered methods: {:?}", registry.methods());
    Ok(Dispatcher::new(registry))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let dispatcher = build_dispatcher(Duration::from_secs(args.timeout_secs))?;

    match args.transport {
        Transport::Stdio => {
            info!("Serving JSON-RPC on stdin/stdout");
            let reader = BufReader::new(tokio::io::stdin());
            serve_lines(&dispatcher, &CallContext::background(), reader, tokio::io::stdout())
                .await
                .context("stdio transport failed")?;
        }
        Transport::Http => {
            let server = HttpRpcServer::builder()
                .bind_address(args.bind)
                .build(dispatcher);
            tokio::select! {
                result = server.run() => result.context("HTTP server failed")?,
                _ = tokio::signal::ctrl_c() => info!("Shutting down"),
            }
        }
    }

    Ok(())
}
