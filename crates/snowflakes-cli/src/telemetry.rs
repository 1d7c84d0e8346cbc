//! Log output for the CLI.
//!
//! Logs go to stderr through `tracing-subscriber`'s `fmt` layer so stdout only
//! carries IDs. Verbosity follows `RUST_LOG` and defaults to `warn`; set
//! `RUST_LOG=snowflakes=trace` to see every generated ID.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
