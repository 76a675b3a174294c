use super::*;
use pretty_assertions::assert_eq;
use std::path::Path;

const EMPTY_BLOB: &str = "e69de29";

/// helper to diff two optional strings labelled with unix-style absolute paths
fn diff(old: Option<&str>, new: Option<&str>) -> String {
    unified_diff(
        DiffSide::new(Path::new("/tmp/old/file.txt"), old.map(str::as_bytes)),
        DiffSide::new(Path::new("/work/file.txt"), new.map(str::as_bytes)),
        3,
    )
    .unwrap()
}

/// helper to drop the index line, whose hashes are not part of the contract
fn without_index(diff: &str) -> String {
    diff.lines()
        .filter(|line| !line.starts_with("index "))
        .map(|line| format!("{line}\n"))
        .collect()
}

/// helper to build numbered lines, replacing the given line numbers
fn numbered_lines(count: usize, replace: &[(usize, &str)]) -> String {
    (1..=count)
        .map(|n| match replace.iter().find(|(line, _)| *line == n) {
            Some((_, text)) => format!("{text}\n"),
            None => format!("{n}\n"),
        })
        .collect()
}

#[test]
fn test_added_file() {
    let output = diff(None, Some("added\n"));

    assert_eq!(
        without_index(&output),
        "diff --git a/tmp/old/file.txt b/work/file.txt\n\
         new file mode 100644\n\
         --- /dev/null\n\
         +++ b/work/file.txt\n\
         @@ -0,0 +1 @@\n\
         +added\n"
    );
    assert!(output.contains("\nindex 0000000.."));
}

#[test]
fn test_deleted_file() {
    let output = diff(Some("deleted\n"), None);

    assert_eq!(
        without_index(&output),
        "diff --git a/tmp/old/file.txt b/work/file.txt\n\
         deleted file mode 100644\n\
         --- a/tmp/old/file.txt\n\
         +++ /dev/null\n\
         @@ -1 +0,0 @@\n\
         -deleted\n"
    );
    assert!(output.contains("..0000000\n"));
}

#[test]
fn test_modified_file_index_line_has_mode() {
    let output = diff(Some("modified... bar\n"), Some("modified... foo\n"));

    let index_line = output
        .lines()
        .find(|line| line.starts_with("index "))
        .expect("diff should have an index line");
    assert!(index_line.ends_with(" 100644"), "{index_line}");
    assert!(output.ends_with("@@ -1 +1 @@\n-modified... bar\n+modified... foo\n"));
}

#[test]
fn test_index_line_uses_git_blob_ids() {
    let output = diff(Some(""), None);
    assert!(
        output.contains(&format!("index {EMPTY_BLOB}..0000000\n")),
        "{output}"
    );
}

#[test]
fn test_empty_file_has_no_file_lines() {
    let output = diff(None, Some(""));

    assert_eq!(
        without_index(&output),
        "diff --git a/tmp/old/file.txt b/work/file.txt\n\
         new file mode 100644\n"
    );
}

#[test]
fn test_hunks_are_split_with_context() {
    let old = numbered_lines(20, &[]);
    let new = numbered_lines(20, &[(2, "two"), (18, "eighteen")]);

    let output = diff(Some(&old), Some(&new));

    assert_eq!(
        without_index(&output),
        "diff --git a/tmp/old/file.txt b/work/file.txt\n\
         --- a/tmp/old/file.txt\n\
         +++ b/work/file.txt\n\
         @@ -1,5 +1,5 @@\n \
         1\n\
         -2\n\
         +two\n \
         3\n \
         4\n \
         5\n\
         @@ -15,6 +15,6 @@\n \
         15\n \
         16\n \
         17\n\
         -18\n\
         +eighteen\n \
         19\n \
         20\n"
    );
}

#[test]
fn test_context_lines_option() {
    let old = numbered_lines(10, &[]);
    let new = numbered_lines(10, &[(5, "five")]);

    let output = unified_diff(
        DiffSide::new(Path::new("/a/f"), Some(old.as_bytes())),
        DiffSide::new(Path::new("/b/f"), Some(new.as_bytes())),
        0,
    )
    .unwrap();

    assert!(output.ends_with("@@ -5 +5 @@\n-5\n+five\n"), "{output}");
}

#[test]
fn test_missing_trailing_newline() {
    let output = diff(Some("a\n"), Some("a"));
    assert!(
        output.ends_with("@@ -1 +1 @@\n-a\n+a\n\\ No newline at end of file\n"),
        "{output}"
    );

    let output = diff(Some("a"), Some("b\n"));
    assert!(
        output.ends_with("@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b\n"),
        "{output}"
    );
}

#[test]
fn test_binary_content() {
    let output = unified_diff(
        DiffSide::new(Path::new("/tmp/old/data.bin"), None),
        DiffSide::new(Path::new("/work/data.bin"), Some([0x00, 0x01, 0x02].as_slice())),
        3,
    )
    .unwrap();

    assert_eq!(
        without_index(&output),
        "diff --git a/tmp/old/data.bin b/work/data.bin\n\
         new file mode 100644\n\
         Binary files /dev/null and b/work/data.bin differ\n"
    );
}

#[test]
fn test_windows_paths_are_quoted() {
    let output = unified_diff(
        DiffSide::new(Path::new(r"C:\tmp\old\file.txt"), Some(b"x\n".as_slice())),
        DiffSide::new(Path::new(r"C:\work\file.txt"), Some(b"y\n".as_slice())),
        3,
    )
    .unwrap();

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines[0],
        r#"diff --git "a/C:\\tmp\\old\\file.txt" "b/C:\\work\\file.txt""#
    );
    assert_eq!(lines[2], r#"--- "a/C:\\tmp\\old\\file.txt""#);
    assert_eq!(lines[3], r#"+++ "b/C:\\work\\file.txt""#);
}

#[test]
fn test_hunk_range() {
    assert_eq!(hunk_range(0, 0), "0,0");
    assert_eq!(hunk_range(1, 1), "1");
    assert_eq!(hunk_range(4, 7), "4,7");
}

#[test]
fn test_section_heading() {
    assert_eq!(section_heading(b"@@ -1 +1 @@\n"), "");
    assert_eq!(
        section_heading(b"@@ -10,7 +10,7 @@ fn main() {\n"),
        " fn main() {"
    );
    assert_eq!(section_heading(b""), "");
}
