//! # Logging
//!
//! Installs the global `tracing` subscriber. Output goes to stderr so that
//! stdout carries only the created todos.
//!
//! The level defaults to `info` and is overridden with `RUST_LOG`, e.g.
//!
//! ```bash
//! RUST_LOG=batchpool=trace,batchpool_todo=debug batchpool-todo --input todos.json
//! ```

use tracing_subscriber::{
    EnvFilter, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Installs the subscriber, formatting events as JSON lines when `json` is set
/// and as pretty multi-line records otherwise.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(json: bool) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_target(false)
        .with_timer(ChronoLocal::rfc_3339());

    if json {
        registry.with(fmt.json()).try_init()?;
    } else {
        registry.with(fmt.pretty()).try_init()?;
    }
    Ok(())
}
