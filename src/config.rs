// ⚙️ Configuration
//
// Precedence: command-line flag > environment variable > default.
// A `.env` file in the working directory is read into the environment first
// (via dotenvy), so it sits at the environment level.

use crate::logging::LogFormat;
use crate::report::DEFAULT_REPORT_LIMIT;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "grade-registry",
    version,
    about = "Academic records registry: students, courses, grades, rankings and transcripts"
)]
pub struct Cli {
    /// Data folder to load at startup (students.txt, courses.txt, grades.txt)
    #[arg(long = "data", env = "REGISTRY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Largest row count a top-N report may request
    #[arg(long, env = "REGISTRY_REPORT_LIMIT", default_value_t = DEFAULT_REPORT_LIMIT)]
    pub report_limit: usize,

    /// Log output: pretty | json
    #[arg(long, env = "REGISTRY_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Listen address for the HTTP server
    #[arg(long, env = "REGISTRY_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub report_limit: usize,
    pub log_format: LogFormat,
    pub bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            report_limit: DEFAULT_REPORT_LIMIT,
            log_format: LogFormat::Pretty,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            data_dir: cli.data_dir,
            report_limit: cli.report_limit,
            log_format: cli.log_format,
            bind: cli.bind,
        }
    }
}

impl Config {
    /// Read `.env`, then parse the process arguments.
    pub fn load() -> Self {
        // A missing .env file is normal
        dotenvy::dotenv().ok();
        Cli::parse().into()
    }
}
