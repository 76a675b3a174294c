//! diff local files against their content at a ref on a remote gitiles host
//!
//! the result is one normalized, git-style unified diff per requested file,
//! suitable for presubmit checks that need to show what a change does
//! relative to the remote baseline

pub mod changeset;
pub mod config;
pub mod constants;
pub mod error;
pub mod git;
pub mod normalize;
pub mod presubmit;
mod quote;
pub mod resolver;
pub mod ui;

pub use changeset::{DiffResult, FileDiff, FileState};
pub use config::DiffConfig;
pub use error::{DiffError, FetchError};
pub use normalize::normalize_diff;
pub use presubmit::{DiffRequest, create_diffs};
pub use resolver::{ContentResolver, GitilesResolver};
