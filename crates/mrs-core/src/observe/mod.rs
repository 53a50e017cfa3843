//! # Observability
//!
//! Structured logging for runs via `tracing`. The library only emits events;
//! binaries decide whether and how to install a subscriber.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
