//! HTTP middleware for the catalog server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context on events)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (recorded on the span, echoed in the response)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
