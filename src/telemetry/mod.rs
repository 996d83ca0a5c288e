//! Logging and tracing setup.
//!
//! - Structured logging via the `tracing` crate, filtered by `RUST_LOG`
//! - One span per sync job so worker output can be told apart

mod init;
mod spans;

pub use init::{init_logging, LogConfig};
pub use spans::job_span;
