use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::RouteError;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::router::pattern::{Method, PathPattern, Segment};

/// Application callback for a matched request.
///
/// A returned error is passed to the server's error handler instead of
/// being sent directly.
pub type Handler = Arc<dyn Fn(&Request, &mut Response<'_>) -> anyhow::Result<()> + Send + Sync>;

/// A registered (method, template, handler) triple.
pub struct Endpoint {
    method: Method,
    pattern: PathPattern,
    handler: Handler,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Splits a request target into path parameters and query values.
    pub fn extract_params_and_query(
        &self,
        path_with_query: &str,
    ) -> Result<(HashMap<String, String>, HashMap<String, String>), RouteError> {
        extract_params_and_query(
            path_with_query,
            self.pattern.param_positions(),
            self.pattern.segments(),
        )
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("template", &self.pattern.template())
            .finish_non_exhaustive()
    }
}

/// Ordered list of endpoints.
///
/// Resolution is a linear scan in registration order and the first
/// endpoint whose method and pattern both match wins.
#[derive(Debug, Default)]
pub struct RouteTable {
    endpoints: Vec<Endpoint>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` on `template`.
    ///
    /// `template` segments are literal text, `*` or `:name`. Unsupported
    /// methods are rejected.
    pub fn add_path<H>(&mut self, method: &str, template: &str, handler: H) -> Result<(), RouteError>
    where
        H: Fn(&Request, &mut Response<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let method = Method::parse(method)?;
        let pattern = PathPattern::compile(template)?;

        debug!(method = %method, template, pattern = pattern.as_str(), "Registered endpoint");

        self.endpoints.push(Endpoint {
            method,
            pattern,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Finds the first endpoint registered for `method` whose pattern occurs
    /// in `path`.
    pub fn resolve(&self, method: &str, path: &str) -> Result<&Endpoint, RouteError> {
        let method = Method::parse(method)?;

        self.endpoints
            .iter()
            .find(|ep| ep.method == method && ep.pattern.is_match(path))
            .ok_or_else(|| RouteError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            })
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Binds path parameters and parses the query string of a request target.
///
/// `param_positions` index both `template_segments` (for the name) and the
/// request's own `/`-split path (for the value).
pub fn extract_params_and_query(
    path_with_query: &str,
    param_positions: &[usize],
    template_segments: &[Segment],
) -> Result<(HashMap<String, String>, HashMap<String, String>), RouteError> {
    let (path, query) = split_target(path_with_query);
    let request_segments: Vec<&str> = path.split('/').collect();
    let mut params = HashMap::new();

    for &idx in param_positions {
        let Some(Segment::Param(name)) = template_segments.get(idx) else {
            continue;
        };

        let value = request_segments
            .get(idx)
            .ok_or_else(|| RouteError::ParamOutOfRange {
                name: name.clone(),
                index: idx,
                segments: request_segments.len(),
            })?;

        params.insert(name.clone(), value.to_string());
    }

    Ok((params, query.map(parse_query).unwrap_or_default()))
}

/// Splits a target on `?` into the path and the query string, if any.
///
/// Anything after a second `?` is dropped.
pub fn split_target(path_with_query: &str) -> (&str, Option<&str>) {
    let mut parts = path_with_query.split('?');
    let path = parts.next().unwrap_or_default();
    (path, parts.next())
}

/// Parses `a=1&b=2` pairs.
///
/// A pair without `=` is skipped. Only the text up to a second `=` is kept
/// as the value, so `a=1=2` yields `a` -> `1`.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for pair in query.split('&') {
        let mut parts = pair.split('=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            values.insert(key.to_string(), value.to_string());
        }
    }

    values
}
