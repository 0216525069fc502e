//! Tracing subscriber setup for the command-line tool.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log to stderr. `RUST_LOG` wins over `-v` when set.
pub fn init(verbosity: u8) -> Result<()> {
    let default = match verbosity {
        0 => "warn",
        1 => "qspec=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("initialize logging")
}
