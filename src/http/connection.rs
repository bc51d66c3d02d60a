use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufStream};

use crate::config::Config;
use crate::http::gate::{self, Verdict};
use crate::http::parser::{MAX_BODY_SIZE, ParseError, parse_http_request};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::http::static_files::{self, Resolution};
use crate::http::writer::ResponseWriter;

/// Bytes requested from the socket per read.
const READ_CHUNK_SIZE: usize = 4096;

/// Response framing state for the request being served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Framing {
    /// Close the connection once this response is flushed.
    pub must_close: bool,
    /// The status line and headers are already on the wire.
    pub headers_sent: bool,
}

impl Framing {
    pub fn for_request(req: &Request) -> Self {
        Self {
            must_close: !req.keep_alive(),
            headers_sent: false,
        }
    }
}

/// One accepted connection. Owned by a single task for its whole life.
pub struct Connection<S> {
    stream: BufStream<S>,
    buffer: BytesMut,
    state: ConnectionState,
    framing: Framing,
    config: Arc<Config>,
}

pub enum ConnectionState {
    AwaitRequest,
    Serving(Request),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<Config>) -> Self {
        Self {
            stream: BufStream::new(stream),
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            state: ConnectionState::AwaitRequest,
            framing: Framing::default(),
            config,
        }
    }

    /// Serves requests until the peer goes away, a response requires the
    /// connection to close, or an I/O error occurs. The stream is shut down
    /// on every exit path.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        self.state = ConnectionState::Closed;

        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "shutdown failed");
        }

        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::AwaitRequest => {
                    self.state = match self.read_request().await? {
                        Some(req) => ConnectionState::Serving(req),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Serving(req) => {
                    let served = self.serve(&req).await;
                    self.stream.flush().await?;
                    served?;

                    self.state = if self.framing.must_close {
                        ConnectionState::Closed
                    } else {
                        ConnectionState::AwaitRequest
                    };
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Reads until a full request head is buffered.
    ///
    /// Returns `Ok(None)` when the peer closes the connection. A malformed
    /// request is answered with 400 and reported as an error.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {}

                Err(e) => {
                    self.reject_malformed().await;
                    return Err(anyhow::anyhow!("HTTP parse error: {:?}", e));
                }
            }

            self.buffer.reserve(READ_CHUNK_SIZE);
            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                if !self.buffer.is_empty() {
                    tracing::debug!(pending = self.buffer.len(), "peer closed mid-request");
                }
                return Ok(None);
            }
        }
    }

    async fn reject_malformed(&mut self) {
        self.framing = Framing {
            must_close: true,
            headers_sent: false,
        };

        let mut writer = ResponseWriter::new(&Response::bad_request(), true);
        let sent = match writer.write_to_stream(&mut self.stream).await {
            Ok(()) => self.stream.flush().await.map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            tracing::debug!(error = %e, "could not send 400");
        }
    }

    async fn serve(&mut self, req: &Request) -> anyhow::Result<()> {
        self.framing = Framing::for_request(req);

        let verdict = gate::check(req);
        self.settle_body(req).await?;

        let status = match verdict {
            Verdict::Reject(response) => {
                self.send_response(req, &response).await?;
                response.status
            }
            Verdict::Proceed => {
                let resolution = static_files::resolve(self.config.root(), &req.path).await;
                match resolution {
                    Resolution::Found(file) => {
                        static_files::send_file(&mut self.stream, req, file, &mut self.framing)
                            .await?;
                        StatusCode::Ok
                    }
                    Resolution::NotFound => {
                        let response = Response::not_found(&req.path);
                        self.send_response(req, &response).await?;
                        response.status
                    }
                }
            }
        };

        tracing::debug!(
            method = req.method.as_str(),
            path = %req.path,
            version = %req.version,
            status = status.as_u16(),
            close = self.framing.must_close,
            "request served"
        );

        Ok(())
    }

    /// Deals with the body declared by `req` before anything is answered.
    ///
    /// With `Expect`, or past `MAX_BODY_SIZE`, the body is left unread and
    /// the connection closes after the response. Any other body is read and
    /// dropped so the next request lines up.
    async fn settle_body(&mut self, req: &Request) -> anyhow::Result<()> {
        let len = req.content_length();
        if len == 0 {
            return Ok(());
        }

        if req.expect().is_some() || len > MAX_BODY_SIZE {
            tracing::debug!(len, "leaving request body unread");
            self.framing.must_close = true;
            return Ok(());
        }

        self.discard_body(len).await
    }

    async fn discard_body(&mut self, len: usize) -> anyhow::Result<()> {
        let buffered = len.min(self.buffer.len());
        self.buffer.advance(buffered);
        let mut remaining = len - buffered;

        while remaining > 0 {
            self.buffer.reserve(READ_CHUNK_SIZE);
            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                anyhow::bail!("peer closed with {} body bytes outstanding", remaining);
            }

            let take = remaining.min(self.buffer.len());
            self.buffer.advance(take);
            remaining -= take;
        }

        Ok(())
    }

    async fn send_response(&mut self, req: &Request, response: &Response) -> anyhow::Result<()> {
        if self.framing.headers_sent {
            anyhow::bail!("response head already sent");
        }

        let mut writer = if !req.version.has_head() {
            ResponseWriter::body_only(response)
        } else if req.method == Method::HEAD {
            ResponseWriter::head_only(response, self.framing.must_close)
        } else {
            ResponseWriter::new(response, self.framing.must_close)
        };
        writer.write_to_stream(&mut self.stream).await?;
        self.framing.headers_sent = true;

        Ok(())
    }
}
