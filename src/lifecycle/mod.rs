//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve credentials → Build relay → Bind listener → Serve
//!
//! Signals (signals.rs):
//!     Ctrl+C → stop accepting, drain in-flight requests
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and happens before the listener opens
//! - Listener binds last (traffic only when ready)

pub mod signals;
pub mod startup;
