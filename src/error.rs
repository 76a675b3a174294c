use std::path::PathBuf;
use thiserror::Error;

/// failure to fetch a file from the remote host
///
/// a missing file is not an error: resolvers report it as `Ok(None)`
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("{url} returned invalid base64 content")]
    Decode {
        url: String,
        #[source]
        source: base64::DecodeError,
    },
}

impl FetchError {
    /// whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Transport { .. } => true,
            Self::Decode { .. } => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("{path}: file exists neither locally nor at {git_ref}")]
    MissingFile { path: String, git_ref: String },

    #[error("{path}: failed to fetch remote content")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },

    #[error("{path}: {action} {}", .file.display())]
    Io {
        path: String,
        action: &'static str,
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: not a relative path inside the root directory")]
    InvalidPath { path: String },

    #[error("{path}: failed to create diff")]
    Backend {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("invalid root directory {}", .root.display())]
    Root {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create staging directory")]
    Staging(#[source] std::io::Error),

    #[error("failed to start worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
