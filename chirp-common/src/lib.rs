//! Shared plumbing for the chirp crates.
//!
//! Right now this is only the logging setup in [`observability`]; the binary calls
//! [`observability::init_logging`] once and library crates just emit `tracing` events.
pub mod observability;

pub use observability::{LogConfig, LogFormat, init_logging};
