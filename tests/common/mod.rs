//! Shared fixtures: a temporary site on disk and a tiny response decoder.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use webdir::config::Config;
use webdir::http::connection::Connection;

pub const INDEX_HTML: &[u8] = b"<html><body>hello</body></html>\n";
pub const SECRET: &[u8] = b"top secret\n";

/// Layout:
///
/// ```text
/// <tmp>/secret               outside the root
/// <tmp>/www/index.html
/// <tmp>/www/notes.txt
/// <tmp>/www/feed.xml
/// <tmp>/www/logo.png
/// <tmp>/www/anim.gif
/// <tmp>/www/data             no extension
/// <tmp>/www/page.html.txt
/// <tmp>/www/docs/index.html
/// <tmp>/www/empty/           no index
/// <tmp>/www/nested/index.html/   directory named index.html
/// ```
pub struct Site {
    _dir: TempDir,
    pub root: PathBuf,
}

impl Site {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("www");

        fs::write(dir.path().join("secret"), SECRET).unwrap();
        fs::create_dir(&root).unwrap();
        fs::write(root.join("index.html"), INDEX_HTML).unwrap();
        fs::write(root.join("notes.txt"), b"plain notes\n").unwrap();
        fs::write(root.join("feed.xml"), b"<feed/>\n").unwrap();
        fs::write(root.join("logo.png"), b"\x89PNG\r\n\x1a\n").unwrap();
        fs::write(root.join("anim.gif"), b"GIF89a").unwrap();
        fs::write(root.join("data"), b"\x00\x01\x02\x03").unwrap();
        fs::write(root.join("page.html.txt"), b"not html").unwrap();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("docs").join("index.html"), b"<p>docs</p>").unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        fs::create_dir_all(root.join("nested").join("index.html")).unwrap();

        Self { _dir: dir, root }
    }

    pub fn config(&self) -> Arc<Config> {
        Arc::new(Config::new(&self.root))
    }

    pub fn write(&self, name: &str, contents: &[u8]) {
        fs::write(self.root.join(name), contents).unwrap();
    }
}

/// Feeds `request` to a fresh connection over an in-memory pipe, half-closes
/// the client side and returns everything the server wrote, plus the result
/// of the connection task.
pub async fn exchange(root: &Path, request: &[u8]) -> (Vec<u8>, anyhow::Result<()>) {
    let (mut client, server) = tokio::io::duplex(1 << 20);
    let cfg = Arc::new(Config::new(root));

    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, cfg);
        conn.run().await
    });

    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    (out, task.await.unwrap())
}

/// Like [`exchange`] but the client never half-closes: whatever comes back
/// must arrive while the server could still be waiting for more input.
/// Fails if the server has not closed the connection within `wait`.
pub async fn exchange_held_open(
    root: &Path,
    request: &[u8],
    wait: Duration,
) -> (Vec<u8>, anyhow::Result<()>) {
    let (mut client, server) = tokio::io::duplex(1 << 20);
    let cfg = Arc::new(Config::new(root));

    let task = tokio::spawn(async move {
        let mut conn = Connection::new(server, cfg);
        conn.run().await
    });

    client.write_all(request).await.unwrap();

    let mut out = Vec::new();
    tokio::time::timeout(wait, client.read_to_end(&mut out))
        .await
        .expect("server kept the connection open waiting for a body")
        .unwrap();

    (out, task.await.unwrap())
}

#[derive(Debug)]
pub struct ParsedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub chunked: bool,
}

impl ParsedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Splits a byte stream into responses. Bodies are delimited by chunked
/// framing, Content-Length, or end of input, in that order of preference.
pub fn parse_responses(mut raw: &[u8]) -> Vec<ParsedResponse> {
    let mut out = Vec::new();

    while !raw.is_empty() {
        let mut slots = [httparse::EMPTY_HEADER; 32];
        let mut resp = httparse::Response::new(&mut slots);
        let head_len = match resp.parse(raw).unwrap() {
            httparse::Status::Complete(n) => n,
            httparse::Status::Partial => panic!("truncated response head"),
        };
        let status = resp.code.unwrap();
        let headers: Vec<(String, String)> = resp
            .headers
            .iter()
            .map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).into_owned()))
            .collect();

        let find = |name: &str| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        };
        let chunked = find("Transfer-Encoding").as_deref() == Some("chunked");
        let content_length = find("Content-Length").map(|v| v.parse::<usize>().unwrap());

        raw = &raw[head_len..];
        let body = if chunked {
            let (body, used) = decode_chunked(raw);
            raw = &raw[used..];
            body
        } else if let Some(len) = content_length {
            let body = raw[..len].to_vec();
            raw = &raw[len..];
            body
        } else {
            let body = raw.to_vec();
            raw = &[];
            body
        };

        out.push(ParsedResponse {
            status,
            headers,
            body,
            chunked,
        });
    }

    out
}

fn decode_chunked(raw: &[u8]) -> (Vec<u8>, usize) {
    let mut body = Vec::new();
    let mut pos = 0;

    loop {
        let line_end = raw[pos..]
            .windows(2)
            .position(|w| w == b"\r\n")
            .expect("chunk size line")
            + pos;
        let size_str = std::str::from_utf8(&raw[pos..line_end]).unwrap();
        let size = usize::from_str_radix(size_str.trim(), 16).unwrap();
        pos = line_end + 2;

        if size == 0 {
            assert_eq!(&raw[pos..pos + 2], b"\r\n");
            return (body, pos + 2);
        }

        body.extend_from_slice(&raw[pos..pos + size]);
        pos += size;
        assert_eq!(&raw[pos..pos + 2], b"\r\n");
        pos += 2;
    }
}
