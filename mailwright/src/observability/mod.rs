//! Logging setup
//!
//! The pipeline reports through `tracing`; this module installs a subscriber
//! for binaries that do not bring their own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub const fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,mailwright=trace"
    } else {
        "info"
    }
}

/// Initialize logging
///
/// Sets up:
/// - Pretty output in debug builds, JSON in release builds
/// - Filtering from `RUST_LOG`, falling back to [`default_directives`]
///
/// # Example
///
/// ```rust,no_run
/// use mailwright::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    init_with(default_directives())
}

/// Initialize logging with explicit fallback directives
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_with(directives: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    Ok(())
}
