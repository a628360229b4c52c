//! Logger bootstrap

use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use crate::{LogConfig, RuntimeError, RuntimeResult};

/// Install the global `tracing` subscriber.
///
/// The configured level is the default directive; `RUST_LOG` refines it.
/// A second call returns `LoggingAlreadyInitialized` and leaves the first
/// subscriber in place.
pub fn init_logging(config: &LogConfig) -> RuntimeResult<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    installed.map_err(|_| RuntimeError::LoggingAlreadyInitialized)
}

fn build_filter(config: &LogConfig) -> RuntimeResult<EnvFilter> {
    let directive: Directive = config.level.parse()?;
    Ok(EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy())
}
