//! HTTP protocol implementation.
//!
//! This module implements a read-only HTTP/1.0 and HTTP/1.1 file server with
//! support for persistent connections and chunked responses. Bare HTTP/0.9
//! `GET` lines are answered with the body alone.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection request/response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation
//! - **`response`**: Buffered responses (error pages) with builder pattern
//! - **`writer`**: Serializes response heads and frames streamed bodies
//! - **`gate`**: Method and `Expect` validation run before any file work
//! - **`static_files`**: Maps request paths to files under the root and streams them
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌────────────────┐
//!        │  AwaitRequest  │ ← Parse next request (peer close / bad input → Closed)
//!        └──────┬─────────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │     Serving      │ ← Gate, resolve, write, flush
//!        └──────┬───────────┘
//!               │ Response flushed
//!               ├─ Keep-Alive → AwaitRequest (same connection)
//!               └─ Must close → Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use webdir::config::Config;
//! use webdir::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::new("/srv/www"));
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let config = Arc::clone(&config);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, config);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod gate;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod static_files;
pub mod writer;
