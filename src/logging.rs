// 🪵 Logging - one-shot tracing subscriber setup
//
// Logs always go to stderr: stdout carries the interactive protocol.

use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "grade_registry=info";

static INIT_ONCE: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Install the global subscriber. Later calls are no-ops.
///
/// `RUST_LOG` overrides the default `grade_registry=info` filter.
pub fn init(format: LogFormat) {
    INIT_ONCE.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // try_init: a test harness may already own the global dispatcher
        let _ = match format {
            LogFormat::Pretty => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init(),
        };
    });
}
