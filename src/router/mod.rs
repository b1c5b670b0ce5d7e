//! Route registration and resolution.
//!
//! Templates are split on `/`; each segment is literal text, `*` (any one
//! segment) or `:name` (any one segment, captured under the key `:name`).
//! Literal text is regular expression source, so `^` and `$` anchor a
//! template. The table is an ordered list searched linearly, first match
//! wins, and an unanchored pattern matches when it occurs anywhere in the
//! request target.
//!
//! ```
//! # use minserve::router::RouteTable;
//! let mut routes = RouteTable::new();
//! routes
//!     .add_path("get", "/users/:id", |req, res| {
//!         res.set_json_body(&req.params())?;
//!         res.send()?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let endpoint = routes.resolve("GET", "/users/7?full=1").unwrap();
//! let (params, query) = endpoint.extract_params_and_query("/users/7?full=1").unwrap();
//! assert_eq!(params[":id"], "7");
//! assert_eq!(query["full"], "1");
//! ```

pub mod pattern;
pub mod table;

pub use pattern::{Method, PathPattern, Segment};
pub use table::{
    Endpoint, Handler, RouteTable, extract_params_and_query, parse_query, split_target,
};
