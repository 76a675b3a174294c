// diff
pub const DEFAULT_CONTEXT: u32 = 3;
pub const DEFAULT_FILE_MODE: &str = "100644";
pub const ABBREV_HASH_LENGTH: usize = 7;
pub const BINARY_SNIFF_BYTES: usize = 8000;
pub const DEV_NULL: &str = "/dev/null";

// gitiles
pub const DEFAULT_REF: &str = "HEAD";
pub const GITILES_DOMAIN: &str = "googlesource.com";
pub const FETCH_TIMEOUT_SECS: u64 = 30;
pub const FETCH_RETRIES: u32 = 2;
pub const FETCH_RETRY_DELAY_MILLIS: u64 = 500;
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

// workers
pub const MAX_JOBS: usize = 16;
