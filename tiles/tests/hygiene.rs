//! Hygiene: enforces coding standards at test time
//!
//! Scans the tiles crate's production sources for patterns the project
//! does not allow. Each pattern has a budget (ideally zero) and the budget
//! never grows. Output goes through `tracing`, never stdout.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

/// (pattern, description, budget)
const BUDGETS: &[(&str, &str, usize)] = &[
    // Panics: these crash the process.
    (".unwrap()", ".unwrap()", 0),
    (".expect(", ".expect()", 0),
    ("panic!(", "panic!()", 0),
    ("unreachable!(", "unreachable!()", 0),
    ("todo!(", "todo!()", 0),
    ("unimplemented!(", "unimplemented!()", 0),
    // Silent loss: discards errors without inspecting.
    ("let _ =", "let _ =", 0),
    (".ok()", ".ok()", 0),
    // Style / structure.
    ("#[allow(dead_code)]", "#[allow(dead_code)]", 0),
    // Logging.
    ("println!(", "println!()", 0),
    ("eprintln!(", "eprintln!()", 0),
];

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`, excluding `_test.rs` companions.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn hits_for(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_were_found() {
    assert!(!source_files().is_empty(), "no sources under src/: run from the crate root");
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for &(pattern, description, budget) in BUDGETS {
        let hits = hits_for(&files, pattern);
        let count: usize = hits.iter().map(|(_, c)| c).sum();
        if count > budget {
            let detail = hits
                .iter()
                .map(|(path, c)| format!("    {path}: {c}"))
                .collect::<Vec<_>>()
                .join("\n");
            failures.push(format!("  {description}: found {count}, max {budget}\n{detail}"));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}
