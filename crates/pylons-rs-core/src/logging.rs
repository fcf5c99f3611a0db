//! Tracing setup driven by [`Settings`], and the per-request span.

use tracing_subscriber::{fmt, EnvFilter};

use crate::settings::Settings;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable, with source locations.
    Pretty,
    /// Single-line, human-readable.
    Compact,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Picks the format from the `log_format` setting.
    ///
    /// Without a recognised `log_format`, debug mode logs pretty and
    /// everything else logs JSON.
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.get_non_empty("log_format").map(str::to_ascii_lowercase).as_deref() {
            Some("pretty") => Self::Pretty,
            Some("compact") => Self::Compact,
            Some("json") => Self::Json,
            _ if settings.debug() => Self::Pretty,
            _ => Self::Json,
        }
    }
}

/// Builds the event filter from the `log_level` setting.
///
/// Accepts any `EnvFilter` directive (`"debug"`, `"pylons_rs_config=trace"`);
/// an unparsable directive falls back to `info`.
pub fn log_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_new(settings.log_level()).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global tracing subscriber described by `settings`.
///
/// Installing a second subscriber is a no-op.
pub fn setup_logging(settings: &Settings) {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(log_filter(settings))
        .with_target(true);

    let installed = match LogFormat::from_settings(settings) {
        LogFormat::Pretty => builder
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("A tracing subscriber is already installed");
    }
}

/// Creates the span a dispatched request runs in.
///
/// # Examples
///
/// ```
/// use pylons_rs_core::logging::request_span;
///
/// let span = request_span("GET", "/messages/1");
/// let _guard = span.enter();
/// tracing::info!("handling request");
/// ```
pub fn request_span(method: &str, path: &str) -> tracing::Span {
    tracing::info_span!("request", method = method, path = path)
}
