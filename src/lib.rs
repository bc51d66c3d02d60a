//! webdir - read-only static file server
//!
//! Core library for the HTTP layer and the connection listener.

pub mod config;
pub mod http;
pub mod server;
