use crate::constants::{
    DEFAULT_CONTEXT, FETCH_RETRIES, FETCH_RETRY_DELAY_MILLIS, FETCH_TIMEOUT_SECS, MAX_JOBS,
};
use std::time::Duration;

/// settings shared by the resolver and the diff synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffConfig {
    /// number of context lines around each hunk
    pub context_lines: u32,

    /// number of files processed concurrently
    pub jobs: usize,

    /// timeout for a single remote fetch
    pub fetch_timeout: Duration,

    /// extra attempts for transient fetch failures
    pub fetch_retries: u32,

    /// delay before the first retry, doubled on each subsequent one
    pub retry_delay: Duration,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT,
            jobs: default_jobs(),
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            fetch_retries: FETCH_RETRIES,
            retry_delay: Duration::from_millis(FETCH_RETRY_DELAY_MILLIS),
        }
    }
}

/// available parallelism, capped so a presubmit doesn't hammer the host
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_JOBS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_jobs_is_bounded() {
        let jobs = default_jobs();
        assert!(jobs >= 1);
        assert!(jobs <= MAX_JOBS);
    }

    #[test]
    fn test_defaults() {
        let config = DiffConfig::default();
        assert_eq!(config.context_lines, 3);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }
}
