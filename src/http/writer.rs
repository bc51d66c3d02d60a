use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = concat!("webdir/", env!("CARGO_PKG_VERSION"));

/// Serializes a status line and headers, terminated by the blank line.
///
/// `Server` is always added; `Connection: close` is added when the
/// connection ends after this response.
pub fn serialize_head(status: StatusCode, headers: &[(String, String)], close: bool) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    let mut push = |k: &str, v: &str| {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    };

    push("Server", SERVER_NAME);
    for (k, v) in headers {
        push(k.as_str(), v.as_str());
    }
    if close {
        push("Connection", "close");
    }

    buf.extend_from_slice(b"\r\n");
    buf
}

/// Writes a fully buffered response.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, close: bool) -> Self {
        let mut buffer = serialize_head(response.status, &response.headers, close);
        buffer.extend_from_slice(&response.body);

        Self { buffer, written: 0 }
    }

    /// Same head as [`ResponseWriter::new`] but no body, for HEAD requests.
    pub fn head_only(response: &Response, close: bool) -> Self {
        Self {
            buffer: serialize_head(response.status, &response.headers, close),
            written: 0,
        }
    }

    /// The body with no status line or headers, for HTTP/0.9 requests.
    pub fn body_only(response: &Response) -> Self {
        Self {
            buffer: response.body.clone(),
            written: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        Ok(())
    }
}

/// How a streamed body is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    /// HTTP/1.1 chunked transfer coding.
    Chunked,
    /// Raw bytes; the end of the body is the end of the connection.
    UntilClose,
}

/// Streams body bytes using the chosen framing.
pub struct BodyWriter {
    framing: BodyFraming,
}

impl BodyWriter {
    pub fn new(framing: BodyFraming) -> Self {
        Self { framing }
    }

    pub fn framing(&self) -> BodyFraming {
        self.framing
    }

    pub async fn write_chunk<W>(&mut self, stream: &mut W, data: &[u8]) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        // A zero-size chunk would terminate the body
        if data.is_empty() {
            return Ok(());
        }

        match self.framing {
            BodyFraming::Chunked => {
                stream
                    .write_all(format!("{:X}\r\n", data.len()).as_bytes())
                    .await?;
                stream.write_all(data).await?;
                stream.write_all(b"\r\n").await
            }
            BodyFraming::UntilClose => stream.write_all(data).await,
        }
    }

    /// Marks the end of the body.
    pub async fn finish<W>(self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        match self.framing {
            BodyFraming::Chunked => stream.write_all(b"0\r\n\r\n").await,
            BodyFraming::UntilClose => Ok(()),
        }
    }
}
