use crate::constants::{ABBREV_HASH_LENGTH, BINARY_SNIFF_BYTES, DEFAULT_FILE_MODE, DEV_NULL};
use crate::quote;
use git2::{DiffOptions, ObjectType, Oid, Patch};
use std::fmt::Write;
use std::path::Path;

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file\n";

/// one side of a diff: the path it is labelled with and its content, if the file exists
#[derive(Debug, Clone, Copy)]
pub struct DiffSide<'a> {
    pub path: &'a Path,
    pub content: Option<&'a [u8]>,
}

impl<'a> DiffSide<'a> {
    pub fn new(path: &'a Path, content: Option<&'a [u8]>) -> Self {
        Self { path, content }
    }
}

/// render a git-style unified diff between two buffers
///
/// sides are labelled the way `git diff --no-index` labels absolute paths:
/// `a/` or `b/` followed by the path without its leading `/`, quoted when
/// the path contains backslashes, quotes or non-ascii bytes
pub fn unified_diff(
    old: DiffSide<'_>,
    new: DiffSide<'_>,
    context_lines: u32,
) -> Result<String, git2::Error> {
    let old_label = label('a', old.path);
    let new_label = label('b', new.path);
    let mut output = String::new();

    let _ = writeln!(output, "diff --git {old_label} {new_label}");
    match (old.content, new.content) {
        (None, Some(_)) => {
            let _ = writeln!(output, "new file mode {DEFAULT_FILE_MODE}");
        }
        (Some(_), None) => {
            let _ = writeln!(output, "deleted file mode {DEFAULT_FILE_MODE}");
        }
        _ => {}
    }

    let _ = write!(
        output,
        "index {}..{}",
        abbreviated_blob_id(old.content)?,
        abbreviated_blob_id(new.content)?
    );
    if old.content.is_some() && new.content.is_some() {
        let _ = write!(output, " {DEFAULT_FILE_MODE}");
    }
    output.push('\n');

    let old_name = if old.content.is_some() { old_label.as_str() } else { DEV_NULL };
    let new_name = if new.content.is_some() { new_label.as_str() } else { DEV_NULL };
    let old_bytes = old.content.unwrap_or_default();
    let new_bytes = new.content.unwrap_or_default();

    if is_binary(old_bytes) || is_binary(new_bytes) {
        let _ = writeln!(output, "Binary files {old_name} and {new_name} differ");
        return Ok(output);
    }

    let mut opts = DiffOptions::new();
    opts.context_lines(context_lines);
    opts.force_text(true);
    let patch = Patch::from_buffers(old_bytes, None, new_bytes, None, Some(&mut opts))?;

    // git leaves out the file lines entirely when there is nothing to show,
    // e.g. for an empty file being added or deleted
    if patch.num_hunks() == 0 {
        return Ok(output);
    }

    let _ = writeln!(output, "--- {old_name}");
    let _ = writeln!(output, "+++ {new_name}");
    write_hunks(&patch, &mut output)?;

    Ok(output)
}

fn write_hunks(patch: &Patch<'_>, output: &mut String) -> Result<(), git2::Error> {
    for hunk_idx in 0..patch.num_hunks() {
        let (hunk, line_count) = patch.hunk(hunk_idx)?;
        let _ = writeln!(
            output,
            "@@ -{} +{} @@{}",
            hunk_range(hunk.old_start(), hunk.old_lines()),
            hunk_range(hunk.new_start(), hunk.new_lines()),
            section_heading(hunk.header())
        );

        // set while the last line written lacks its trailing newline
        let mut open_line = false;
        for line_idx in 0..line_count {
            let line = patch.line_in_hunk(hunk_idx, line_idx)?;
            match line.origin() {
                origin @ ('+' | '-' | ' ') => {
                    if open_line {
                        output.push('\n');
                        output.push_str(NO_NEWLINE_MARKER);
                    }
                    let content = line.content();
                    output.push(origin);
                    output.push_str(&String::from_utf8_lossy(content));
                    open_line = !content.ends_with(b"\n");
                }
                // end-of-file newline markers ('=', '>', '<')
                _ => {
                    if open_line {
                        output.push('\n');
                        output.push_str(NO_NEWLINE_MARKER);
                        open_line = false;
                    }
                }
            }
        }
        if open_line {
            output.push('\n');
            output.push_str(NO_NEWLINE_MARKER);
        }
    }

    Ok(())
}

/// `a/<path>` label for a diff header, quoted if git would quote it
fn label(side: char, path: &Path) -> String {
    let path = path.to_string_lossy();
    let name = format!("{side}/{}", path.trim_start_matches('/'));
    quote::quote(&name)
}

/// abbreviated git blob id of the content, zeros when the file is absent
fn abbreviated_blob_id(content: Option<&[u8]>) -> Result<String, git2::Error> {
    let oid = match content {
        Some(bytes) => Oid::hash_object(ObjectType::Blob, bytes)?,
        None => Oid::zero(),
    };
    let mut id = oid.to_string();
    id.truncate(ABBREV_HASH_LENGTH);
    Ok(id)
}

/// git's heuristic: a NUL byte near the start means binary
fn is_binary(content: &[u8]) -> bool {
    content.iter().take(BINARY_SNIFF_BYTES).any(|&b| b == 0)
}

/// `start,count` range, with a count of one left implicit as git does
fn hunk_range(start: u32, count: u32) -> String {
    if count == 1 {
        start.to_string()
    } else {
        format!("{start},{count}")
    }
}

/// function context the backend appended after the closing `@@`, if any
fn section_heading(header: &[u8]) -> String {
    let header = String::from_utf8_lossy(header);
    let header = header.trim_end_matches(['\r', '\n']);
    header
        .get(2..)
        .and_then(|rest| rest.find("@@").map(|idx| rest[idx + 2..].to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests;
