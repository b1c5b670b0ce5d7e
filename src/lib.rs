//! minserve - a minimal HTTP/1.1 server on raw TCP sockets
//!
//! Core library: request framing and parsing, routing, responses and the
//! worker pool that serves connections.

pub mod config;
pub mod error;
pub mod http;
pub mod router;
pub mod server;

pub use error::{Fault, ParseError, ResponseError, RouteError, ServeError};
pub use http::request::Request;
pub use http::response::Response;
pub use server::{Server, ServerConfig};
