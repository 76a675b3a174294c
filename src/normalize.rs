//! rewrite diff headers so they only name paths relative to the compared roots
//!
//! diff backends label each side with whatever path they were handed, so a
//! diff between two absolute locations carries those prefixes in its
//! `diff --git`, `---` and `+++` lines, with backslashes and quoting on
//! windows. this is a pure text transform parameterized by both roots: it
//! never looks at the platform it runs on.

use crate::constants::DEV_NULL;
use crate::quote;

const DIFF_GIT: &str = "diff --git ";
const OLD_FILE: &str = "--- ";
const NEW_FILE: &str = "+++ ";
const BINARY_FILES: &str = "Binary files ";
const BINARY_DIFFER: &str = " differ";
const HUNK_HEADER: &str = "@@";

/// strip `before_root` from a-side paths and `after_root` from b-side paths
pub fn normalize_diff(diff: &str, before_root: &str, after_root: &str) -> String {
    let roots = Roots::new(before_root, after_root);
    let mut output = String::with_capacity(diff.len());
    let mut in_hunk = false;

    for line in diff.split_inclusive('\n') {
        let (text, ending) = split_line_ending(line);

        if text.starts_with(DIFF_GIT) {
            in_hunk = false;
        } else if text.starts_with(HUNK_HEADER) {
            in_hunk = true;
        }

        // hunk bodies are content, even when a line looks like a header
        let rewritten = if in_hunk {
            None
        } else {
            roots.rewrite_header(text)
        };

        output.push_str(rewritten.as_deref().unwrap_or(text));
        output.push_str(ending);
    }

    output
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(text) = line.strip_suffix("\r\n") {
        (text, "\r\n")
    } else if let Some(text) = line.strip_suffix('\n') {
        (text, "\n")
    } else {
        (line, "")
    }
}

/// both roots in comparable form: forward slashes, no leading or trailing separator
struct Roots {
    before: String,
    after: String,
}

impl Roots {
    fn new(before: &str, after: &str) -> Self {
        Self {
            before: comparable(before).trim_end_matches('/').to_string(),
            after: comparable(after).trim_end_matches('/').to_string(),
        }
    }

    /// rewritten header line, `None` when the line is not a header we handle
    fn rewrite_header(&self, line: &str) -> Option<String> {
        if let Some(rest) = line.strip_prefix(DIFF_GIT) {
            let (old, new) = self.split_pair(rest, " ")?;
            return Some(format!(
                "{DIFF_GIT}{} {}",
                self.rewrite_token(old),
                self.rewrite_token(new)
            ));
        }

        for prefix in [OLD_FILE, NEW_FILE] {
            if let Some(rest) = line.strip_prefix(prefix) {
                let (token, trailer) = split_file_token(rest);
                return Some(format!("{prefix}{}{trailer}", self.rewrite_token(token)));
            }
        }

        let rest = line
            .strip_prefix(BINARY_FILES)
            .and_then(|rest| rest.strip_suffix(BINARY_DIFFER))?;
        let (old, new) = self.split_pair(rest, " and ")?;
        Some(format!(
            "{BINARY_FILES}{} and {}{BINARY_DIFFER}",
            self.rewrite_token(old),
            self.rewrite_token(new)
        ))
    }

    /// split the two path tokens of a header
    ///
    /// a quoted first token ends at its closing quote. unquoted paths may
    /// contain the separator, so every boundary where a b-side token could
    /// start is considered and the one where both sides name the same
    /// relative path wins, falling back to the first
    fn split_pair<'a>(&self, rest: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
        if rest.starts_with('"')
            && let Some(end) = closing_quote(rest)
            && let Some(new) = rest[end + 1..].strip_prefix(separator)
        {
            return Some((&rest[..=end], new));
        }

        let candidates: Vec<(&str, &str)> = rest
            .match_indices(separator)
            .map(|(idx, _)| (&rest[..idx], &rest[idx + separator.len()..]))
            .filter(|(old, new)| {
                !old.is_empty()
                    && (new.starts_with("b/") || new.starts_with("\"b/") || *new == DEV_NULL)
            })
            .collect();

        candidates
            .iter()
            .find(|(old, new)| match (self.relative(old), self.relative(new)) {
                (Some((_, old)), Some((_, new))) => old == new,
                _ => false,
            })
            .or_else(|| candidates.first())
            .copied()
    }

    /// the token with its root stripped, or the token untouched if it doesn't match
    fn rewrite_token(&self, token: &str) -> String {
        match self.relative(token) {
            Some((side, path)) => quote::quote(&format!("{side}/{path}")),
            None => token.to_string(),
        }
    }

    /// side prefix and root-relative path of an `a/` or `b/` token
    fn relative(&self, token: &str) -> Option<(char, String)> {
        let name = unquote(token);
        let (side, path) = if let Some(path) = name.strip_prefix("a/") {
            ('a', path)
        } else if let Some(path) = name.strip_prefix("b/") {
            ('b', path)
        } else {
            return None;
        };

        let root = if side == 'a' { &self.before } else { &self.after };
        strip_root(path, root).map(|path| (side, path))
    }
}

/// path relative to `root`, both compared with forward slashes and without a
/// leading separator (git drops the leading `/` of absolute paths)
fn strip_root(path: &str, root: &str) -> Option<String> {
    let path = comparable(path);
    let path = path.trim_start_matches('/');
    let root = root.trim_start_matches('/');

    let relative = if root.is_empty() {
        path
    } else {
        path.strip_prefix(root)?.strip_prefix('/')?
    };
    let relative = relative.trim_start_matches('/');

    if relative.is_empty() {
        None
    } else {
        Some(relative.to_string())
    }
}

fn comparable(path: &str) -> String {
    path.replace('\\', "/")
}

/// token contents with git quoting removed; a missing closing quote is tolerated
fn unquote(token: &str) -> String {
    let Some(inner) = token.strip_prefix('"') else {
        return token.to_string();
    };
    let inner = match closing_quote(token) {
        Some(end) => &token[1..end],
        None => inner,
    };
    quote::unescape(inner)
}

/// byte index of the quote closing a token that starts with `"`
fn closing_quote(token: &str) -> Option<usize> {
    let bytes = token.as_bytes();
    let mut idx = 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 2,
            b'"' => return Some(idx),
            _ => idx += 1,
        }
    }
    None
}

/// path token of a `---`/`+++` line and whatever follows it (e.g. a tab and timestamp)
fn split_file_token(rest: &str) -> (&str, &str) {
    if rest.starts_with('"') {
        return match closing_quote(rest) {
            Some(end) => rest.split_at(end + 1),
            None => (rest, ""),
        };
    }
    match rest.find('\t') {
        Some(tab) => rest.split_at(tab),
        None => (rest, ""),
    }
}
