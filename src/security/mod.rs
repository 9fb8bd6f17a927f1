//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-For)
//!     → relay
//! Upstream response:
//!     → headers.rs (strip hop-by-hop)
//!     → client
//! ```

pub mod headers;
