//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / storage / sync / watcher
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted messages
//! - Metric updates are fire-and-forget; with no recorder installed they are no-ops
//! - RUST_LOG overrides the configured log level

pub mod logging;
pub mod metrics;
