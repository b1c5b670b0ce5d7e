use std::collections::HashMap;

use crate::error::ParseError;

/// Request line and headers pulled out of a raw request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: String,
    /// Request target as sent, query string included.
    pub path: String,
    pub version: String,
    pub headers: HashMap<String, String>,
}

/// Parses the accumulated bytes of one request.
///
/// The buffer is split on `\n`. The first line must carry at least three
/// space-separated tokens (method, target, version). Every other non-blank
/// line is split once on `": "` into a header name and value; a line without
/// the separator becomes a header with an empty value. Later duplicates
/// replace earlier ones.
pub fn parse_http_request(buf: &[u8]) -> Result<ParsedRequest, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::EmptyRequest);
    }

    let text = String::from_utf8_lossy(buf);
    let mut lines = text.split('\n');

    // Request line
    let request_line = lines.next().unwrap_or_default().trim();
    let mut parts = request_line.split(' ');

    let (method, path, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version)) => (method, path, version),
        _ => return Err(ParseError::MalformedRequestLine(request_line.to_string())),
    };

    Ok(ParsedRequest {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
        headers: parse_headers(lines),
    })
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(": ").unwrap_or((line, ""));
        headers.insert(key.to_string(), value.to_string());
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let parsed = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
    }

    #[test]
    fn header_without_separator_keeps_name() {
        let headers = parse_headers(["BrokenHeader", "  ", "X-A: 1"].into_iter());

        assert_eq!(headers.get("BrokenHeader").unwrap(), "");
        assert_eq!(headers.get("X-A").unwrap(), "1");
        assert_eq!(headers.len(), 2);
    }
}
