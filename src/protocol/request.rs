//! Request head for relay connections
//!
//! Every TCP connection opens with a small HTTP-like head that names the
//! endpoint and carries the stream id:
//!
//! ```text
//! POST /stream\r\n
//! StreamId: camera-1\r\n
//! \r\n
//! <producer body ...>
//! ```
//!
//! Lines may end in `\n` or `\r\n`, header names are case-insensitive, and an
//! optional protocol version after the path is ignored. No response head is
//! sent back; consumers start receiving relayed bytes right away.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{RequestError, Result};
use crate::registry::StreamId;

/// Header carrying the stream id
pub const STREAM_ID_HEADER: &str = "StreamId";

/// Path of the producer endpoint
pub const STREAM_PATH: &str = "/stream";

/// Path of the consumer endpoint
pub const CAPTURE_PATH: &str = "/capture";

/// Endpoint selected by the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Producer: the body is relayed to consumers
    Stream,
    /// Consumer: receives relayed bytes until it disconnects
    Capture,
}

/// Parsed request head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    headers: Vec<(String, String)>,
}

impl RequestHead {
    /// Create a head for encoding on the client side
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
        }
    }

    /// Head for a producer connection
    pub fn stream(stream: &StreamId) -> Self {
        Self::new("POST", STREAM_PATH).with_header(STREAM_ID_HEADER, stream.as_str())
    }

    /// Head for a consumer connection
    pub fn capture(stream: &StreamId) -> Self {
        Self::new("GET", CAPTURE_PATH).with_header(STREAM_ID_HEADER, stream.as_str())
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Stream id from the head; empty if the header is absent
    pub fn stream_id(&self) -> StreamId {
        StreamId::new(self.header(STREAM_ID_HEADER).unwrap_or_default())
    }

    /// Resolve the endpoint from the path, ignoring any query string
    pub fn endpoint(&self) -> std::result::Result<Endpoint, RequestError> {
        let path = self.path.split('?').next().unwrap_or_default();
        match path {
            STREAM_PATH => Ok(Endpoint::Stream),
            CAPTURE_PATH => Ok(Endpoint::Capture),
            other => Err(RequestError::UnknownPath(other.to_string())),
        }
    }

    /// Serialize the head, including the terminating blank line
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_slice(self.method.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.path.as_bytes());
        buf.put_slice(b"\r\n");
        for (name, value) in &self.headers {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(b"\r\n");
        buf.freeze()
    }
}

/// Read a request head, consuming exactly up to the blank line
///
/// Bytes after the head stay buffered in `reader` so the caller can continue
/// reading the body from it.
pub async fn read_request_head<R>(reader: &mut R, max_len: usize) -> Result<RequestHead>
where
    R: AsyncBufRead + Unpin,
{
    let mut limited = reader.take(max_len as u64);
    let mut line = Vec::new();
    let mut head: Option<RequestHead> = None;

    loop {
        line.clear();
        let n = limited.read_until(b'\n', &mut line).await?;

        if n == 0 || !line.ends_with(b"\n") {
            if limited.limit() == 0 {
                return Err(RequestError::TooLarge(max_len).into());
            }
            return match head {
                None if n == 0 => Err(RequestError::Empty.into()),
                _ => Err(RequestError::Malformed("unterminated request head".into()).into()),
            };
        }

        let text = std::str::from_utf8(&line)
            .map_err(|_| RequestError::Malformed("request head is not utf-8".into()))?
            .trim_end_matches(['\r', '\n']);

        let Some(current) = head.as_mut() else {
            head = Some(parse_request_line(text)?);
            continue;
        };

        if text.is_empty() {
            return Ok(current.clone());
        }

        let (name, value) = text
            .split_once(':')
            .ok_or_else(|| RequestError::Malformed(format!("bad header line: {text}")))?;
        current
            .headers
            .push((name.trim().to_string(), value.trim().to_string()));
    }
}

fn parse_request_line(line: &str) -> std::result::Result<RequestHead, RequestError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(method), Some(path)) => Ok(RequestHead::new(method, path)),
        _ => Err(RequestError::Malformed(format!("bad request line: {line}"))),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::BufReader;

    use super::*;
    use crate::error::Error;

    async fn parse(input: &[u8]) -> Result<RequestHead> {
        let mut reader = BufReader::new(input);
        read_request_head(&mut reader, 1024).await
    }

    #[tokio::test]
    async fn test_parse_producer_head() {
        let head = parse(b"POST /stream HTTP/1.1\r\nStreamId: s1\r\nX-Other: y\r\n\r\n")
            .await
            .unwrap();

        assert_eq!(head.method, "POST");
        assert_eq!(head.endpoint().unwrap(), Endpoint::Stream);
        assert_eq!(head.stream_id(), StreamId::from("s1"));
        assert_eq!(head.header("x-other"), Some("y"));
    }

    #[tokio::test]
    async fn test_header_names_are_case_insensitive() {
        let head = parse(b"GET /capture\nstreamid:  cam \n\n").await.unwrap();

        assert_eq!(head.endpoint().unwrap(), Endpoint::Capture);
        assert_eq!(head.stream_id(), StreamId::from("cam"));
    }

    #[tokio::test]
    async fn test_missing_stream_header_is_empty_id() {
        let head = parse(b"POST /stream\r\n\r\n").await.unwrap();
        assert!(head.stream_id().is_empty());
    }

    #[tokio::test]
    async fn test_body_stays_in_reader() {
        let mut reader = BufReader::new(&b"POST /stream\r\nStreamId: s\r\n\r\nbody"[..]);
        read_request_head(&mut reader, 1024).await.unwrap();

        let mut body = Vec::new();
        reader.read_to_end(&mut body).await.unwrap();
        assert_eq!(body, b"body");
    }

    #[tokio::test]
    async fn test_unknown_path_and_query() {
        let head = parse(b"GET /capture?x=1\r\n\r\n").await.unwrap();
        assert_eq!(head.endpoint().unwrap(), Endpoint::Capture);

        let head = parse(b"GET /index.html\r\n\r\n").await.unwrap();
        assert!(matches!(head.endpoint(), Err(RequestError::UnknownPath(p)) if p == "/index.html"));
    }

    #[tokio::test]
    async fn test_rejects_bad_heads() {
        assert!(matches!(
            parse(b"").await,
            Err(Error::Request(RequestError::Empty))
        ));
        assert!(matches!(
            parse(b"POST\r\n\r\n").await,
            Err(Error::Request(RequestError::Malformed(_)))
        ));
        assert!(matches!(
            parse(b"POST /stream\r\nno-colon\r\n\r\n").await,
            Err(Error::Request(RequestError::Malformed(_)))
        ));
        assert!(matches!(
            parse(b"POST /stream\r\nStreamId: s1\r\n").await,
            Err(Error::Request(RequestError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_rejects_oversized_head() {
        let mut input = b"POST /stream\r\nStreamId: ".to_vec();
        input.extend(std::iter::repeat(b'a').take(2048));
        input.extend_from_slice(b"\r\n\r\n");

        assert!(matches!(
            parse(&input).await,
            Err(Error::Request(RequestError::TooLarge(1024)))
        ));
    }

    #[tokio::test]
    async fn test_encode_parses_back() {
        let stream = StreamId::from("s1");
        let encoded = RequestHead::capture(&stream).encode();
        assert_eq!(&encoded[..], b"GET /capture\r\nStreamId: s1\r\n\r\n");
    }
}
