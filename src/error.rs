//! Error types shared across the request pipeline.
//!
//! Errors fall into three groups:
//!
//! - configuration errors ([`RouteError::UnsupportedMethod`] at registration,
//!   bind failures) which are returned straight to the caller,
//! - per-request errors ([`ServeError`]) which are handed to the configured
//!   error handler so it can still produce a response,
//! - per-connection faults ([`Fault`]) which are converted into the fixed
//!   500 JSON response at the connection boundary.

use std::io;

use thiserror::Error;

/// Failure to make sense of the raw request bytes.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),
}

/// Failure to register or resolve a route.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("method not supported: {0}")]
    UnsupportedMethod(String),
    #[error("path not found: {method} {path}")]
    NotFound { method: String, path: String },
    #[error("parameter {name:?} at segment {index} is out of range for a path with {segments} segments")]
    ParamOutOfRange {
        name: String,
        index: usize,
        segments: usize,
    },
    #[error("invalid path template {template:?}: {source}")]
    InvalidTemplate {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure while building or sending a response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("response already sent")]
    AlreadySent,
    #[error("failed to write response: {0}")]
    Io(#[from] io::Error),
}

/// A per-request error routed to the server's error handler.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Handler(anyhow::Error),
}

/// An unexpected failure inside a single connection.
///
/// Never escapes the connection that produced it.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("handler panicked: {0}")]
    Panic(String),
    #[error(transparent)]
    Route(RouteError),
    #[error("handler task failed: {0}")]
    Task(#[source] tokio::task::JoinError),
}
