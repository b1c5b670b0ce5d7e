use std::collections::HashMap;
use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use crate::error::ResponseError;
use crate::http::writer::serialize_response;

pub const SERVER_NAME: &str = "minserve";

/// Response under construction for one request.
///
/// Handlers mutate it in place and finish with [`Response::send`], which
/// serializes the message and hands it to the injected sink in a single
/// `write` call. Nothing reaches the client unless `send` is called.
pub struct Response<'a> {
    headers: HashMap<String, String>,
    status: u16,
    body: Vec<u8>,
    sink: &'a mut dyn Write,
    sent: bool,
}

impl<'a> Response<'a> {
    /// Creates a 200 response with the default headers preseeded.
    pub fn new(sink: &'a mut dyn Write) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Date".to_string(), http_date());
        headers.insert("Server".to_string(), SERVER_NAME.to_string());
        headers.insert("Content-Type".to_string(), "plain/text".to_string());
        headers.insert("Content-Length".to_string(), "0".to_string());

        Self {
            headers,
            status: 200,
            body: Vec::new(),
            sink,
            sent: false,
        }
    }

    /// Adds or replaces a header.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Replaces the body, setting Content-Type and Content-Length to match.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>, content_type: &str) {
        self.body = body.into();
        self.set_header("Content-Type", content_type);
        self.set_header("Content-Length", self.body.len().to_string());
    }

    /// Serializes `value` as the JSON body.
    ///
    /// On failure the response is left untouched.
    pub fn set_json_body<T>(&mut self, value: &T) -> Result<(), ResponseError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(value)?;
        self.set_body(data, "application/json");
        Ok(())
    }

    /// Writes the response through the sink. Only the first call writes.
    pub fn send(&mut self) -> Result<(), ResponseError> {
        if self.sent {
            return Err(ResponseError::AlreadySent);
        }
        self.sent = true;

        let bytes = serialize_response(self.status, &self.headers, &self.body);
        self.sink.write_all(&bytes)?;
        Ok(())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }
}

fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
