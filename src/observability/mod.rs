//! Observability subsystem.
//!
//! Structured logging only: one line per inbound request plus startup and
//! error events. There are no metrics or tracing exporters.

pub mod logging;
