use std::collections::HashMap;

/// Snapshot of one parsed request, handed to handler code.
///
/// Built fresh for every connection and never mutated afterwards. `path`
/// keeps the raw request target including any query string; the decoded
/// pieces live in `params` and `query`.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    path: String,
    version: String,
    headers: HashMap<String, String>,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
}

/// Builder for constructing Request objects.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            params: self.params,
            query: self.query,
        })
    }
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// The method token exactly as the client sent it.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The raw request target, query string included.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Retrieves a header value by name.
    ///
    /// Header names are stored with the client's casing. An exact match is
    /// preferred; otherwise the first ASCII case-insensitive match is used.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(key)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .map(|v| v.as_str())
    }

    /// Value captured by a `:name` segment of the matched template.
    ///
    /// Params are keyed by the template segment, colon included. The
    /// colon may be left off: `param("id")` and `param(":id")` are the same
    /// lookup.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .or_else(|| {
                if name.starts_with(':') {
                    None
                } else {
                    self.params.get(&format!(":{name}"))
                }
            })
            .map(|v| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(|v| v.as_str())
    }
}
