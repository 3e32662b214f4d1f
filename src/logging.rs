//! Structured logging bootstrap using `tracing`.
//!
//! Everything goes to stderr; stdout carries only the frequency report so it
//! can be piped or redirected.

use std::io::IsTerminal;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Pipeline progress at info; the remote NER client's connection chatter
/// only when something goes wrong.
const DEFAULT_DIRECTIVES: &str = "info,reqwest=warn,hyper=warn,hyper_util=warn,rustls=warn";

/// `RUST_LOG` when set and valid, the defaults otherwise.
fn resolve_filter(from_env: Option<&str>) -> Result<EnvFilter> {
    match from_env.map(EnvFilter::try_new) {
        Some(Ok(filter)) => Ok(filter),
        _ => Ok(EnvFilter::try_new(DEFAULT_DIRECTIVES)?),
    }
}

/// Install the global subscriber once per process.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = resolve_filter(rust_log.as_deref())?;
    let stderr = std::io::stderr();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr.is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;
    tracing::debug!(directives = DEFAULT_DIRECTIVES, "tracing initialised");
    Ok(())
}
