// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SAMPLE: &str = "\
diff --git a/src/main.rs b/src/main.rs
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@
 fn main() {
-    println!(\"hi\");
+    println!(\"hello\");
+    println!(\"world\");
 }
diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -10,2 +10,3 @@
 struct Foo;
+def helper():
";

#[test]
fn looks_like_diff_detects_git_header() {
    assert!(looks_like_diff(SAMPLE));
    assert!(!looks_like_diff("just some plain response text"));
}

#[test]
fn parse_diff_splits_into_per_file_records() {
    let files = parse_diff(SAMPLE);
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].old_path, "src/main.rs");
    assert_eq!(files[0].new_path, "src/main.rs");
    assert!(!files[0].binary);
    assert_eq!(files[0].hunks.len(), 1);

    let hunk = &files[0].hunks[0];
    assert_eq!(hunk.old_start, 1);
    assert_eq!(hunk.old_count, 3);
    assert_eq!(hunk.new_start, 1);
    assert_eq!(hunk.new_count, 4);
    assert!(hunk.lines.iter().any(|l| l.starts_with('-')));
    assert!(hunk.lines.iter().any(|l| l.starts_with('+')));
}

#[test]
fn parse_diff_flags_binary_files() {
    let diff = "diff --git a/img.png b/img.png\nBinary files a/img.png and b/img.png differ\n";
    let files = parse_diff(diff);
    assert_eq!(files.len(), 1);
    assert!(files[0].binary);
    assert!(files[0].hunks.is_empty());
}

#[test]
fn summarize_reports_file_count_and_symbols() {
    let files = parse_diff(SAMPLE);
    let summary = summarize(&files);
    assert!(summary.starts_with("Modified 2 files:"));
    assert!(summary.contains("src/main.rs"));
    assert!(summary.contains("helper"));
}

#[test]
fn summarize_empty_diff() {
    assert_eq!(summarize(&[]), "No changes.");
}
