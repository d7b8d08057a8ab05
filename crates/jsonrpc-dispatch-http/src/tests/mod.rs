//! Test modules for jsonrpc-dispatch-http
//!
//! Handler tests drive `RpcHttpHandler` with in-memory requests; the server
//! tests go through a real TCP connection.
