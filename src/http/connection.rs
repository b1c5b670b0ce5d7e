use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::task;
use tracing::{debug, error, warn};

use crate::error::{Fault, ServeError};
use crate::http::framing::FrameReader;
use crate::http::parser::{ParsedRequest, parse_http_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::router::{Handler, RouteTable, parse_query, split_target};
use crate::server::ErrorHandler;

/// Everything a worker needs to serve one connection.
///
/// Built once before serving and shared read-only between workers.
pub struct Pipeline<F> {
    routes: Arc<RouteTable>,
    error_handler: ErrorHandler,
    framing: F,
}

pub enum ConnectionState {
    Reading,
    Parsed(ParsedRequest),
    Routed(Handler, Request),
    Handling(Invocation),
    Responding(ResponseWriter),
    Faulted(Fault),
    Closed,
}

/// User code waiting to run against a fresh response.
pub enum Invocation {
    /// The matched endpoint's handler.
    Endpoint(Handler, Request),
    /// The error handler, for a request that failed before reaching one.
    Error(Request, ServeError),
}

impl<F: FrameReader> Pipeline<F> {
    pub fn new(routes: Arc<RouteTable>, error_handler: ErrorHandler, framing: F) -> Self {
        Self {
            routes,
            error_handler,
            framing,
        }
    }

    /// Serves exactly one request on `stream`, then closes it.
    ///
    /// Faults are answered with a 500 and logged; they never propagate to
    /// the caller. Handler code runs on the blocking thread pool so a slow
    /// handler never stalls the runtime threads other workers need.
    pub async fn run<S>(&self, mut stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let mut state = ConnectionState::Reading;

        loop {
            state = match state {
                ConnectionState::Reading => match self.framing.read_frame(&mut stream).await {
                    Ok(frame) if frame.is_empty() => {
                        debug!("Connection sent no data");
                        ConnectionState::Closed
                    }
                    Ok(frame) => match parse_http_request(&frame) {
                        Ok(parsed) => ConnectionState::Parsed(parsed),
                        Err(e) => ConnectionState::Handling(Invocation::Error(
                            Request::default(),
                            e.into(),
                        )),
                    },
                    Err(e) => ConnectionState::Faulted(Fault::Read(e)),
                },

                ConnectionState::Parsed(parsed) => self.route(parsed),

                ConnectionState::Routed(handler, request) => {
                    debug!(method = request.method(), path = request.path(), "Routed request");
                    ConnectionState::Handling(Invocation::Endpoint(handler, request))
                }

                ConnectionState::Handling(invocation) => {
                    let error_handler = Arc::clone(&self.error_handler);
                    match task::spawn_blocking(move || invoke(invocation, &error_handler)).await {
                        Ok(Ok(out)) => ConnectionState::Responding(ResponseWriter::new(out)),
                        Ok(Err(fault)) => ConnectionState::Faulted(fault),
                        Err(e) => ConnectionState::Faulted(Fault::Task(e)),
                    }
                }

                ConnectionState::Faulted(fault) => {
                    error!(error = %fault, "Connection fault");
                    ConnectionState::Responding(ResponseWriter::new(fault_response(&fault)))
                }

                ConnectionState::Responding(mut writer) => {
                    if writer.is_empty() {
                        debug!("Handler produced no response");
                    } else if let Err(e) = writer.write_to_stream(&mut stream).await {
                        warn!(error = %e, "Failed to write response");
                    }
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        let _ = stream.shutdown().await;
    }

    /// Resolves a parsed request to its endpoint and builds the request
    /// snapshot the handler sees.
    ///
    /// Resolution errors go to the error handler with the query parsed and
    /// no params. A matched template with more segments than the request
    /// path is a fault.
    pub fn route(&self, parsed: ParsedRequest) -> ConnectionState {
        let endpoint = match self.routes.resolve(&parsed.method, &parsed.path) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                let query = split_target(&parsed.path)
                    .1
                    .map(parse_query)
                    .unwrap_or_default();
                let request = snapshot(parsed, HashMap::new(), query);
                return ConnectionState::Handling(Invocation::Error(request, e.into()));
            }
        };

        match endpoint.extract_params_and_query(&parsed.path) {
            Ok((params, query)) => {
                let handler = Arc::clone(endpoint.handler());
                ConnectionState::Routed(handler, snapshot(parsed, params, query))
            }
            Err(e) => ConnectionState::Faulted(Fault::Route(e)),
        }
    }
}

fn snapshot(
    parsed: ParsedRequest,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
) -> Request {
    Request::builder()
        .method(parsed.method)
        .path(parsed.path)
        .version(parsed.version)
        .headers(parsed.headers)
        .params(params)
        .query(query)
        .build()
        .unwrap_or_default()
}

/// Runs handler code and returns the bytes it sent.
///
/// A handler error is passed to the error handler, discarding anything the
/// handler sent first. A panic in either becomes a fault.
pub fn invoke(invocation: Invocation, error_handler: &ErrorHandler) -> Result<Vec<u8>, Fault> {
    let mut out = Vec::new();

    match invocation {
        Invocation::Endpoint(handler, request) => {
            let result = guarded(&mut out, |out| {
                let mut response = Response::new(out);
                handler(&request, &mut response)
            })?;

            if let Err(e) = result {
                out.clear();
                report(error_handler, &request, &mut out, ServeError::Handler(e))?;
            }
        }
        Invocation::Error(request, err) => report(error_handler, &request, &mut out, err)?,
    }

    Ok(out)
}

fn report(
    error_handler: &ErrorHandler,
    request: &Request,
    out: &mut Vec<u8>,
    err: ServeError,
) -> Result<(), Fault> {
    guarded(out, |out| {
        let mut response = Response::new(out);
        error_handler(request, &mut response, &err);
    })
}

/// Runs user code against the output buffer, turning a panic into a fault.
fn guarded<T>(out: &mut Vec<u8>, f: impl FnOnce(&mut Vec<u8>) -> T) -> Result<T, Fault> {
    panic::catch_unwind(AssertUnwindSafe(|| f(&mut *out))).map_err(|payload| {
        out.clear();
        Fault::Panic(panic_message(payload))
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fixed-shape 500 for faults that escaped the normal error path.
pub fn fault_response(fault: &Fault) -> Vec<u8> {
    let mut out = Vec::new();
    let mut response = Response::new(&mut out);
    response.set_status(500);

    let body = json!({
        "error": fault.to_string(),
        "message": "Internal Server Error",
        "unexpected": true,
    });

    if let Err(e) = response.set_json_body(&body).and_then(|_| response.send()) {
        error!(error = %e, "Failed to build fault response");
    }

    out
}
