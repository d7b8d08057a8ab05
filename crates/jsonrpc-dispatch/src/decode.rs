//! Request decoding. Single object or batch is decided by the first significant byte.

use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::error::JsonRpcErrorObject;
use crate::request::JsonRpcRequest;

const BATCH_OPEN: u8 = b'[';

/// Read `source` to the end and decode its first JSON value into requests.
///
/// - unreadable or empty source: `ParseError`
/// - malformed object or batch: `InvalidRequest` with the decoder message as data
///
/// An empty batch decodes to an empty vector; rejecting it is up to the caller.
pub async fn decode_requests<R>(mut source: R) -> Result<Vec<JsonRpcRequest>, JsonRpcErrorObject>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    source.read_to_end(&mut buf).await.map_err(|err| {
        JsonRpcErrorObject::parse_error(format!("fail to read the request text: {}", err))
    })?;
    decode_requests_from_slice(&buf)
}

/// Same contract as [`decode_requests`] for an in-memory body.
pub fn decode_requests_from_slice(bytes: &[u8]) -> Result<Vec<JsonRpcRequest>, JsonRpcErrorObject> {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .ok_or_else(|| JsonRpcErrorObject::parse_error("fail to read the request text: empty"))?;
    let body = &bytes[start..];

    if body[0] == BATCH_OPEN {
        let batch: Vec<JsonRpcRequest> = first_value(body)?;
        debug!("Decoded batch of {} request(s)", batch.len());
        Ok(batch)
    } else {
        let request: JsonRpcRequest = first_value(body)?;
        Ok(vec![request])
    }
}

/// Decode the leading JSON value and ignore anything after it.
fn first_value<T: DeserializeOwned>(body: &[u8]) -> Result<T, JsonRpcErrorObject> {
    let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<T>();
    match stream.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(err)) => Err(JsonRpcErrorObject::invalid_request(err.to_string())),
        None => Err(JsonRpcErrorObject::invalid_request("unexpected end of input")),
    }
}
