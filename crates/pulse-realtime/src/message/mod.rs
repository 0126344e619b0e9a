//! Server-to-client wire envelope and builders for the standard job events.

pub mod builder;
pub mod envelope;

pub use envelope::Envelope;
