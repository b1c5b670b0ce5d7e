//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 surface: one request per connection, no
//! body framing, connection closed after the response.
//!
//! # Architecture
//!
//! - **`framing`**: decides when an inbound request is complete
//! - **`parser`**: request line and header parsing
//! - **`request`**: immutable request snapshot handed to handlers
//! - **`response`**: response under construction, sent through a byte sink
//! - **`status`**: reason phrases with category fallback
//! - **`writer`**: response serialization and socket writes
//! - **`connection`**: the per-connection pipeline
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate bytes until the peer pauses
//!        └──────┬──────┘
//!               │ Frame received (empty frame → Closed)
//!               ▼
//!        ┌─────────────┐
//!        │   Parsed    │ ← Resolve against the route table
//!        └──────┬──────┘
//!               │ Endpoint found, params bound
//!               ▼
//!        ┌─────────────┐
//!        │   Routed    │
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐     parse/route error → error handler
//!        │  Handling   │ ← Handler runs on the blocking pool
//!        └──────┬──────┘
//!               │ Response bytes ready          ┌──────────┐
//!               │ ◀──────── 500 JSON ───────────│ Faulted  │ ← read error / panic
//!               ▼                               └──────────┘
//!        ┌─────────────┐
//!        │ Responding  │ ← Write response to client
//!        └──────┬──────┘
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod framing;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
pub mod writer;
