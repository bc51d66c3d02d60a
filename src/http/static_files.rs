//! Maps request paths onto files under the root directory and streams them.
//!
//! Resolution never fails outward: a traversal attempt, a missing file, an
//! unreadable entry and a directory without an index all come back as
//! [`Resolution::NotFound`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::http::connection::Framing;
use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::response::StatusCode;
use crate::http::writer::{BodyFraming, BodyWriter, serialize_head};

/// File served when a request resolves to a directory.
pub const INDEX_FILE: &str = "index.html";

/// Size of each read from the file while streaming the body.
pub const STREAM_CHUNK_SIZE: usize = 8192;

/// An opened regular file, ready to be streamed.
#[derive(Debug)]
pub struct ResolvedFile {
    pub file: File,
    /// Filesystem path the file was opened from
    pub path: PathBuf,
    pub content_type: &'static str,
}

#[derive(Debug)]
pub enum Resolution {
    Found(ResolvedFile),
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Reduces a request target to a decoded absolute path.
///
/// Returns `None` for any target containing `..` (checked both before and
/// after percent-decoding), for targets that are neither origin-form nor an
/// absolute `http`/`https` URL, and for paths that decode to invalid UTF-8
/// or contain NUL.
pub fn request_path(uri: &str) -> Option<String> {
    if uri.contains("..") {
        return None;
    }

    let path = if uri.starts_with('/') {
        uri.split(['?', '#']).next().unwrap_or_default().to_string()
    } else {
        let url = Url::parse(uri).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        url.path().to_string()
    };

    let decoded = urlencoding::decode(&path).ok()?;
    if decoded.contains("..") || decoded.contains('\0') {
        return None;
    }

    Some(decoded.into_owned())
}

/// Joins `root` and a request path by concatenation, so the result always
/// starts with `root` even when `path` is absolute.
pub fn fs_path(root: &Path, path: &str) -> PathBuf {
    let mut full = OsString::from(root.as_os_str());
    full.push("/");
    full.push(path.strip_prefix('/').unwrap_or(path));
    PathBuf::from(full)
}

/// Resolves `uri` against `root`.
///
/// A directory gets exactly one retry with `/index.html` appended; if that
/// is missing or is itself a directory the result is not found.
pub async fn resolve(root: &Path, uri: &str) -> Resolution {
    let Some(path) = request_path(uri) else {
        tracing::debug!(uri, "rejected request path");
        return Resolution::NotFound;
    };

    let mut candidate = fs_path(root, &path);

    for is_fallback in [false, true] {
        if is_fallback {
            candidate.as_mut_os_string().push("/");
            candidate.as_mut_os_string().push(INDEX_FILE);
        }

        let file = match File::open(&candidate).await {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!(path = %candidate.display(), error = %e, "cannot open");
                return Resolution::NotFound;
            }
        };

        let is_dir = match file.metadata().await {
            Ok(meta) => meta.is_dir(),
            Err(e) => {
                tracing::debug!(path = %candidate.display(), error = %e, "cannot stat");
                return Resolution::NotFound;
            }
        };

        if !is_dir {
            let content_type = mime::content_type_for(&candidate.to_string_lossy());
            return Resolution::Found(ResolvedFile {
                file,
                path: candidate,
                content_type,
            });
        }
    }

    Resolution::NotFound
}

/// Writes the success head for `resolved` and streams its contents.
///
/// HTTP/1.1 gets chunked framing; HTTP/1.0 gets a raw body and the
/// connection is marked to close. HEAD requests stop after the head. An
/// HTTP/0.9 request gets the raw body with no head at all.
pub async fn send_file<W>(
    stream: &mut W,
    req: &Request,
    resolved: ResolvedFile,
    framing: &mut Framing,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if framing.headers_sent {
        anyhow::bail!("response head already sent");
    }

    let ResolvedFile {
        mut file,
        path,
        content_type,
    } = resolved;

    let chunked = req.version.is_http11();
    if !chunked {
        framing.must_close = true;
    }

    if req.version.has_head() {
        let mut headers = vec![("Content-type".to_string(), content_type.to_string())];
        if chunked {
            headers.push(("Transfer-Encoding".to_string(), "chunked".to_string()));
        }
        stream
            .write_all(&serialize_head(StatusCode::Ok, &headers, framing.must_close))
            .await?;
    }
    framing.headers_sent = true;

    if req.method == Method::HEAD {
        return Ok(());
    }

    let body = BodyWriter::new(if chunked {
        BodyFraming::Chunked
    } else {
        BodyFraming::UntilClose
    });
    stream_body(stream, &mut file, body, &path, framing).await
}

/// Copies `source` to `stream` through `body` in bounded chunks.
///
/// A write error is returned and ends the connection. A read error on the
/// source truncates the body, withholds the chunked terminator and marks the
/// connection to close, so the client can tell the body is incomplete.
pub async fn stream_body<R, W>(
    stream: &mut W,
    source: &mut R,
    mut body: BodyWriter,
    path: &Path,
    framing: &mut Framing,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; STREAM_CHUNK_SIZE];

    loop {
        let n = match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "read failed mid-body, truncating");
                framing.must_close = true;
                return Ok(());
            }
        };

        body.write_chunk(stream, &buf[..n]).await?;
    }

    body.finish(stream).await?;
    Ok(())
}
