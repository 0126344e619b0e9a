//! Workspace integration tests, compiled as one test binary.

mod helpers;

mod auth_test;
mod rate_limit_test;
mod realtime_test;
mod ws_test;
