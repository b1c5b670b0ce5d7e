use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::RouteError;

/// Matches one path segment of any content.
const ANY_SEGMENT: &str = "[^/]*";

/// Methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Parses a method token, ignoring ASCII case.
    ///
    /// # Example
    ///
    /// ```
    /// # use minserve::router::Method;
    /// assert_eq!(Method::parse("get").unwrap(), Method::Get);
    /// assert!(Method::parse("TRACE").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, RouteError> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "patch" => Ok(Method::Patch),
            "delete" => Ok(Method::Delete),
            _ => Err(RouteError::UnsupportedMethod(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl FromStr for Method {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::parse(s)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `/`-delimited piece of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `*`
    Wildcard,
    /// `:name`, stored as written in the template, colon included.
    Param(String),
}

impl Segment {
    fn from_template(raw: &str) -> Self {
        if raw == "*" {
            Segment::Wildcard
        } else if raw.starts_with(':') {
            Segment::Param(raw.to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    fn to_pattern(&self) -> String {
        match self {
            Segment::Literal(text) => text.clone(),
            Segment::Wildcard | Segment::Param(_) => ANY_SEGMENT.to_string(),
        }
    }
}

/// A path template compiled into a matcher.
///
/// Literal segments are regular expression source and are used as written.
/// Matching is a substring search, not a full match: `/users` matches
/// `/api/users/7` as well. Templates that need an exact match anchor
/// themselves, e.g. `^/users$`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
    param_positions: Vec<usize>,
    regex: Regex,
}

impl PathPattern {
    pub fn compile(template: &str) -> Result<Self, RouteError> {
        let segments: Vec<Segment> = template.split('/').map(Segment::from_template).collect();

        let param_positions = segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| matches!(segment, Segment::Param(_)))
            .map(|(idx, _)| idx)
            .collect();

        let source = segments
            .iter()
            .map(Segment::to_pattern)
            .collect::<Vec<_>>()
            .join("/");

        let regex = Regex::new(&source).map_err(|source| RouteError::InvalidTemplate {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            segments,
            param_positions,
            regex,
        })
    }

    /// True when the compiled pattern occurs anywhere in `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Indices of the `:name` segments, in template order.
    pub fn param_positions(&self) -> &[usize] {
        &self.param_positions
    }

    /// The regular expression the template compiled to.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}
