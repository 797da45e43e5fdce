//! Log output setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Service crates at info; sqlx logs every statement at info otherwise.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines for local runs.
    #[default]
    Pretty,
    /// One JSON object per event, with file and line, for log shipping.
    Json,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl TracingConfig {
    /// `RUST_LOG` for the filter, `LOG_JSON=1` (or `true`) for JSON output.
    pub fn from_env() -> Self {
        let json = std::env::var("LOG_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            filter: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
            format: if json { LogFormat::Json } else { LogFormat::Pretty },
        }
    }
}

/// Install the global subscriber. Returns false if one was already set,
/// which happens when several tests initialize logging.
pub fn init_tracing(config: &TracingConfig) -> bool {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let (json, pretty) = match config.format {
        LogFormat::Json => (
            Some(fmt::layer().json().with_file(true).with_line_number(true)),
            None,
        ),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(true))),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(filter = %config.filter, format = ?config.format, "Logging initialized");
    }
    installed
}

pub fn init_tracing_from_env() {
    init_tracing(&TracingConfig::from_env());
}
