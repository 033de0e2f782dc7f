//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → tower-http TraceLayer span (method, uri, request id)
//!     → logging.rs (structured events, optional per-server dispatch)
//!     → metrics.rs (request counter + latency histogram)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - A caller-supplied `Dispatch` only sees this server's requests
//! - Metrics are cheap to record even with no exporter installed

pub mod logging;
pub mod metrics;
