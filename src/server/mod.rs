//! Server assembly: configuration, route registration and the serving loop.
//!
//! ```text
//!  accept loop ──submit──▶ bounded queue ──recv──▶ worker 1..W
//!                                                   │
//!                                                   ▼
//!                                 read ─▶ parse ─▶ route ─▶ handle ─▶ write ─▶ close
//! ```
//!
//! Everything registered on a [`Server`] is frozen into a shared
//! [`Pipeline`] when serving starts; workers only read it.

pub mod listener;
pub mod worker_pool;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, warn};

use crate::error::{RouteError, ServeError};
use crate::http::connection::Pipeline;
use crate::http::framing::{DEFAULT_IDLE_TIMEOUT, FrameReader, IdleTimeoutFraming};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::router::RouteTable;

pub use worker_pool::WorkerPool;

pub const DEFAULT_QUEUE_SIZE: usize = 1024;

/// Callback that turns a per-request error into a response.
///
/// It is responsible for calling [`Response::send`].
pub type ErrorHandler = Arc<dyn Fn(&Request, &mut Response<'_>, &ServeError) + Send + Sync>;

/// Ten workers per available core.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 10
}

/// Logs the error and answers `{"error": <description>}` with status 500.
pub fn default_error_handler() -> ErrorHandler {
    Arc::new(log_and_respond)
}

fn log_and_respond(req: &Request, res: &mut Response<'_>, err: &ServeError) {
    warn!(method = req.method(), path = req.path(), error = %err, "Request failed");

    res.set_status(500);
    let sent = res
        .set_json_body(&json!({ "error": err.to_string() }))
        .and_then(|_| res.send());

    if let Err(e) = sent {
        error!(error = %e, "Failed to send error response");
    }
}

/// Tunables applied before serving. Zero values mean "use the default".
#[derive(Clone)]
pub struct ServerConfig {
    pub error_handler: Option<ErrorHandler>,
    pub queue_size: usize,
    pub worker_count: usize,
    pub read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            error_handler: None,
            queue_size: DEFAULT_QUEUE_SIZE,
            worker_count: default_worker_count(),
            read_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

pub struct Server<F = IdleTimeoutFraming> {
    routes: RouteTable,
    error_handler: ErrorHandler,
    queue_size: usize,
    worker_count: usize,
    framing: F,
}

impl Server {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let read_timeout = if config.read_timeout.is_zero() {
            DEFAULT_IDLE_TIMEOUT
        } else {
            config.read_timeout
        };

        Self {
            routes: RouteTable::new(),
            error_handler: config.error_handler.unwrap_or_else(default_error_handler),
            queue_size: non_zero_or(config.queue_size, DEFAULT_QUEUE_SIZE),
            worker_count: non_zero_or(config.worker_count, default_worker_count()),
            framing: IdleTimeoutFraming::new(read_timeout),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FrameReader> Server<F> {
    /// Replaces the strategy that decides where a request ends.
    pub fn with_framing<G: FrameReader>(self, framing: G) -> Server<G> {
        Server {
            routes: self.routes,
            error_handler: self.error_handler,
            queue_size: self.queue_size,
            worker_count: self.worker_count,
            framing,
        }
    }

    /// Registers a handler. See [`RouteTable::add_path`].
    pub fn add_path<H>(&mut self, method: &str, template: &str, handler: H) -> Result<(), RouteError>
    where
        H: Fn(&Request, &mut Response<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.routes.add_path(method, template, handler)
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Freezes the registered routes into the pipeline workers share.
    pub fn into_pipeline(self) -> Pipeline<F> {
        Pipeline::new(Arc::new(self.routes), self.error_handler, self.framing)
    }

    /// Binds `address` (`"<host>:<port>"`) and serves until accepting fails.
    pub async fn listen(self, address: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let worker_count = self.worker_count;
        let queue_size = self.queue_size;
        let pipeline = Arc::new(self.into_pipeline());

        let pool = WorkerPool::start(worker_count, queue_size, move |stream: TcpStream| {
            let pipeline = Arc::clone(&pipeline);
            async move { pipeline.run(stream).await }
        });

        listener::run(listener, &pool).await
    }
}

fn non_zero_or(value: usize, default: usize) -> usize {
    if value == 0 { default } else { value }
}
