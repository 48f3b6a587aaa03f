//! Tracing setup helpers
//!
//! The library only emits `tracing` records; installing a subscriber is the
//! application's choice. These helpers cover the common case of a formatted
//! subscriber filtered by `RUST_LOG` or an explicit verbosity level.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize a subscriber filtered by `RUST_LOG`, defaulting to info
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init_tracing() {
    init_tracing_with_level(Level::INFO);
}

/// Initialize a subscriber at the given verbosity level
///
/// `RUST_LOG` still wins when set.
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init_tracing_with_level(level: Level) {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer())
        .init();
}

/// Like [`init_tracing_with_level`], but returns an error instead of
/// panicking when a subscriber is already installed
pub fn try_init_tracing(level: Level) -> Result<(), TracingError> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer())
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// A global subscriber is already installed
    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,
}

// Note: init_tracing itself is not unit-testable here because the global
// subscriber can only be set once per process.
