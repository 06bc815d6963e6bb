//! Log setup for the `weave` binary.
//!
//! Events go to stderr only. Stdout is reserved for what a command prints
//! (transaction JSON, ids, raw payloads) so it can be piped.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter directives applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "weave_cli=info,weave_protocol=info";

/// `--log-format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// JSON lines with event fields flattened to the top level.
    Json,
}

/// Install the global subscriber. Panics if one is already set, so `main`
/// calls this once before anything logs.
///
/// `RUST_LOG` wins over `default_filter`:
///
/// ```text
/// RUST_LOG=weave_protocol=debug weave sign --data-file photo.jpg
/// ```
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let output = match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry().with(filter).with(output).init();
    tracing::debug!(?format, "logging ready");
}
