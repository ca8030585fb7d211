//! Tracing setup for the `dsc` binary.
//!
//! Logs go to stderr so stdout stays parseable. The filter comes from
//! `RUST_LOG` when set, otherwise from [`DEFAULT_LOG_FILTER`] (or `debug`
//! for this crate with `--verbose`).

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "drive_search_client=warn";
const VERBOSE_LOG_FILTER: &str = "drive_search_client=debug";

pub fn filter_for(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new(VERBOSE_LOG_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

pub fn init_logging(verbose: bool) -> Result<()> {
    let ansi = atty::is(atty::Stream::Stderr);
    tracing_subscriber::registry()
        .with(filter_for(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_target(false),
        )
        .try_init()?;
    Ok(())
}
