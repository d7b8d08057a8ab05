//! Line-delimited loop over a byte stream (stdin/stdout and similar pipes).
//!
//! Each non-blank line is one request or batch. Replies are written as one
//! line each; failures that produce no JSON-RPC reply are written as their
//! error text on a line of their own.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace, warn};

use crate::context::CallContext;
use crate::dispatcher::Dispatcher;
use crate::error::DispatchError;

/// Serve frames from `reader` until end of input.
///
/// Returns early only when writing to `writer` fails.
pub async fn serve_lines<R, W>(
    dispatcher: &Dispatcher,
    ctx: &CallContext,
    mut reader: R,
    mut writer: W,
) -> Result<(), DispatchError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    // Raw bytes: a line that is not UTF-8 is a bad request, not a dead stream
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            debug!("Input closed, leaving line loop");
            return Ok(());
        }

        let frame = line.trim_ascii();
        if frame.is_empty() {
            continue;
        }
        trace!(len = frame.len(), "read frame");

        match dispatcher.handle(ctx, frame, &mut writer).await {
            Ok(()) => {}
            Err(DispatchError::Io(err)) => return Err(err.into()),
            Err(err) => {
                warn!("Request failed: {}", err);
                writer.write_all(err.to_string().as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsonRpcErrorObject;
    use crate::registry::MethodRegistry;
    use serde_json::{Value, json};

    fn dispatcher() -> Dispatcher {
        let registry = MethodRegistry::builder()
            .method_fn("echo", |req| async move { Ok(req.params.unwrap_or(Value::Null)) })
            .build()
            .unwrap();
        Dispatcher::new(registry)
    }

    #[tokio::test]
    async fn test_one_line_per_reply() {
        let input = b"{\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"id\":1,\"params\":[1]}\n\
                      \n\
                      {\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"params\":[2]}\n\
                      {\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"id\":3,\"params\":[3]}\n";
        let mut output = Vec::new();
        serve_lines(&dispatcher(), &CallContext::background(), &input[..], &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({"jsonrpc": "2.0", "id": 1, "result": [1]}),
                json!({"jsonrpc": "2.0", "id": 3, "result": [3]}),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_text_then_continue() {
        let input = b"[]\n{\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"id\":1}\n";
        let mut output = Vec::new();
        serve_lines(&dispatcher(), &CallContext::background(), &input[..], &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            JsonRpcErrorObject::invalid_request("no methods specified").to_string()
        );
        assert_eq!(
            lines.next().unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"result":null}"#
        );
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn test_non_utf8_line_does_not_stop_loop() {
        let input = b"\xff\xfe\n{\"jsonrpc\":\"2.0\",\"method\":\"echo\",\"id\":1}\n";
        let mut output = Vec::new();
        serve_lines(&dispatcher(), &CallContext::background(), &input[..], &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().contains("code: -32600"));
        assert_eq!(
            lines.next().unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"result":null}"#
        );
        assert!(lines.next().is_none());
    }
}
