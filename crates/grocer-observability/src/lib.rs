//! Observability for the grocer storefront.
//!
//! This crate provides:
//! - `init_logging` - `tracing` subscriber setup driven by `GROCER_LOG` and config
//! - `AnalyticsEvent` / `AnalyticsSink` - fire-and-forget funnel events
//! - `Notifier` - user-facing success / info / error notices

mod analytics;
mod logging;
mod notice;

pub use analytics::*;
pub use logging::*;
pub use notice::*;

use thiserror::Error;

/// Errors raised while setting up observability.
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}
