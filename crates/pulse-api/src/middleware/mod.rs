//! HTTP middleware: bearer auth, rate limiting, CORS, request logging.

pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
