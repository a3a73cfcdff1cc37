//! Tracing setup for debugging the checker.
//!
//! Output format is chosen by `OCHAIN_LOG_FORMAT`:
//!
//! - `text` (default): plain `tracing-subscriber` lines
//! - `json`: one JSON object per event
//!
//! ```bash
//! OCHAIN_LOG=debug cargo test -p ochain-checker
//! OCHAIN_LOG="ochain_checker::chain=trace" OCHAIN_LOG_FORMAT=json cargo test
//! ```
//!
//! Nothing is installed unless `OCHAIN_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("OCHAIN_LOG_FORMAT").unwrap_or_default())
    }
}

/// `OCHAIN_LOG` wins over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    match std::env::var("OCHAIN_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber, writing to stderr.
///
/// A no-op when neither `OCHAIN_LOG` nor `RUST_LOG` is set, or when a
/// subscriber is already installed.
pub fn init_tracing() {
    if std::env::var_os("OCHAIN_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let filter = build_filter();
    // Err only means a subscriber is already set.
    let _ = match LogFormat::from_env() {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
}
