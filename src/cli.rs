use clap::{Parser, ValueEnum};
use presubmit_diff::config::{DiffConfig, default_jobs};
use presubmit_diff::constants::{DEFAULT_CONTEXT, DEFAULT_REF, FETCH_RETRIES, FETCH_TIMEOUT_SECS};
use std::path::PathBuf;
use std::time::Duration;

/// presubmit-diff: diff local files against their content at a remote gitiles ref
#[derive(Parser, Debug)]
#[command(name = "presubmit-diff", about, long_about = None)]
pub struct Cli {
    /// gitiles host, e.g. "chromium" or "chromium.googlesource.com"
    #[arg(long)]
    pub host: String,

    /// repository on the host, e.g. "chromium/src"
    #[arg(long)]
    pub repo: String,

    /// ref to diff against
    #[arg(long = "ref", default_value = DEFAULT_REF)]
    pub git_ref: String,

    /// directory containing the files
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// write the diff here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// output format
    #[arg(long, value_enum, default_value_t = Format::Patch)]
    pub format: Format,

    /// lines of context around each change
    #[arg(long = "unified", short = 'U', default_value_t = DEFAULT_CONTEXT)]
    pub context_lines: u32,

    /// files processed concurrently (defaults to available cores)
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// timeout for each fetch, in seconds
    #[arg(long, default_value_t = FETCH_TIMEOUT_SECS)]
    pub timeout: u64,

    /// retries for transient fetch failures
    #[arg(long, default_value_t = FETCH_RETRIES)]
    pub retries: u32,

    /// print the state of each file
    #[arg(long, short)]
    pub verbose: bool,

    /// paths relative to the root, as they appear in the repository
    #[arg(required = true)]
    pub files: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// a single patch with every file's diff
    Patch,
    /// an array of {path, state, diff} objects
    Json,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> DiffConfig {
        DiffConfig {
            context_lines: self.context_lines,
            jobs: self.jobs.unwrap_or_else(default_jobs).max(1),
            fetch_timeout: Duration::from_secs(self.timeout),
            fetch_retries: self.retries,
            ..DiffConfig::default()
        }
    }
}
