use crate::changeset::{DiffResult, FileDiff, FileState};
use crate::config::DiffConfig;
use crate::error::DiffError;
use crate::git::{self, DiffSide};
use crate::normalize::normalize_diff;
use crate::resolver::ContentResolver;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::Builder;

/// local files to compare against a ref on a remote host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRequest {
    pub host: String,
    pub repository: String,
    pub git_ref: String,
    /// directory the requested paths are relative to
    pub root: PathBuf,
    /// repository-relative paths, in the order results are wanted
    pub paths: Vec<String>,
}

impl DiffRequest {
    pub fn new<P, S>(
        host: impl Into<String>,
        repository: impl Into<String>,
        git_ref: impl Into<String>,
        root: impl Into<PathBuf>,
        paths: P,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            host: host.into(),
            repository: repository.into(),
            git_ref: git_ref.into(),
            root: root.into(),
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

/// diff every requested file against its content at the remote ref
///
/// the remote content is the origin and the local file the destination.
/// files are processed concurrently but the result keeps request order, with
/// unchanged files present as empty diffs. any failure, including a path that
/// exists on neither side, fails the whole call
pub fn create_diffs<R>(
    resolver: &R,
    request: &DiffRequest,
    config: &DiffConfig,
) -> Result<DiffResult, DiffError>
where
    R: ContentResolver + ?Sized,
{
    let root = resolve_root(&request.root)?;

    // duplicates collapse onto their first occurrence
    let mut seen = HashSet::new();
    let paths: Vec<&str> = request
        .paths
        .iter()
        .map(String::as_str)
        .filter(|path| seen.insert(*path))
        .collect();

    if let Some(path) = paths.iter().find(|path| !is_relative_inside_root(path)) {
        return Err(DiffError::InvalidPath {
            path: (*path).to_string(),
        });
    }

    // remote snapshots are staged here so both sides of a diff name real files
    let staging = Builder::new()
        .prefix("presubmit-diff-")
        .tempdir()
        .map_err(DiffError::Staging)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs.max(1))
        .build()?;

    let results: Vec<Result<FileDiff, DiffError>> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| diff_file(resolver, request, &root, staging.path(), path, config))
            .collect()
    });

    // first failure in request order, regardless of completion order
    let files = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(DiffResult { files })
}

fn diff_file<R>(
    resolver: &R,
    request: &DiffRequest,
    root: &Path,
    staging: &Path,
    path: &str,
    config: &DiffConfig,
) -> Result<FileDiff, DiffError>
where
    R: ContentResolver + ?Sized,
{
    let local_path = root.join(path);
    let local = read_local(&local_path).map_err(|source| DiffError::Io {
        path: path.to_string(),
        action: "failed to read",
        file: local_path.clone(),
        source,
    })?;

    let remote = resolver
        .fetch(&request.host, &request.repository, &request.git_ref, path)
        .map_err(|source| DiffError::Fetch {
            path: path.to_string(),
            source,
        })?;

    let state = FileState::classify(local.as_deref(), remote.as_deref()).ok_or_else(|| {
        DiffError::MissingFile {
            path: path.to_string(),
            git_ref: request.git_ref.clone(),
        }
    })?;

    if state == FileState::Unchanged {
        return Ok(FileDiff {
            path: path.to_string(),
            state,
            diff: String::new(),
        });
    }

    let snapshot_path = staging.join(path);
    if let Some(content) = &remote {
        stage_snapshot(&snapshot_path, content).map_err(|source| DiffError::Io {
            path: path.to_string(),
            action: "failed to stage remote snapshot at",
            file: snapshot_path.clone(),
            source,
        })?;
    }

    let raw = git::unified_diff(
        DiffSide::new(&snapshot_path, remote.as_deref()),
        DiffSide::new(&local_path, local.as_deref()),
        config.context_lines,
    )
    .map_err(|source| DiffError::Backend {
        path: path.to_string(),
        source,
    })?;

    let diff = normalize_diff(&raw, &staging.to_string_lossy(), &root.to_string_lossy());

    Ok(FileDiff {
        path: path.to_string(),
        state,
        diff,
    })
}

/// absolute form of the root, which must be an existing directory
fn resolve_root(root: &Path) -> Result<PathBuf, DiffError> {
    let root_error = |source| DiffError::Root {
        root: root.to_path_buf(),
        source,
    };

    let absolute = std::path::absolute(root).map_err(root_error)?;
    let metadata = fs::metadata(&absolute).map_err(root_error)?;
    if !metadata.is_dir() {
        return Err(root_error(io::Error::from(io::ErrorKind::NotADirectory)));
    }

    Ok(absolute)
}

/// content of a local file, `None` if it doesn't exist
fn read_local(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn stage_snapshot(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// plain relative path made only of normal components, so it can't escape the root
fn is_relative_inside_root(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
