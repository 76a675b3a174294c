use serde::Serialize;
use std::fmt;

/// how a file differs between the remote ref and the local tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Unchanged,
    Added,
    Deleted,
    Modified,
}

impl FileState {
    /// classify from local and remote content, `None` when neither side exists
    pub fn classify(local: Option<&[u8]>, remote: Option<&[u8]>) -> Option<Self> {
        match (local, remote) {
            (None, None) => None,
            (Some(_), None) => Some(Self::Added),
            (None, Some(_)) => Some(Self::Deleted),
            (Some(local), Some(remote)) if local == remote => Some(Self::Unchanged),
            (Some(_), Some(_)) => Some(Self::Modified),
        }
    }

    /// single character status, as `git status --short` would show it
    pub fn status_char(self) -> char {
        match self {
            Self::Unchanged => ' ',
            Self::Added => 'A',
            Self::Deleted => 'D',
            Self::Modified => 'M',
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unchanged => "unchanged",
            Self::Added => "added",
            Self::Deleted => "deleted",
            Self::Modified => "modified",
        };
        f.write_str(name)
    }
}

/// the normalized diff for a single requested file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub path: String,
    pub state: FileState,
    pub diff: String, // empty when unchanged
}

/// diffs for every requested file, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiffResult {
    pub files: Vec<FileDiff>,
}

impl DiffResult {
    /// diff text for a path, `None` if the path was not requested
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.diff.as_str())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileDiff> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// whether any requested file differs from the remote ref
    pub fn has_changes(&self) -> bool {
        self.files.iter().any(|f| f.state != FileState::Unchanged)
    }

    /// all diffs concatenated in request order, as a single patch
    pub fn to_patch(&self) -> String {
        self.files.iter().map(|f| f.diff.as_str()).collect()
    }
}

impl IntoIterator for DiffResult {
    type Item = FileDiff;
    type IntoIter = std::vec::IntoIter<FileDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiffResult {
    type Item = &'a FileDiff;
    type IntoIter = std::slice::Iter<'a, FileDiff>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
