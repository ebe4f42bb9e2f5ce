//! Process output: action outputs, failure signal, and CLI listings.
//!
//! # Action output
//!
//! The rendered report is published as a named output for the surrounding
//! workflow. When `GITHUB_OUTPUT` names a file, a heredoc-style entry is
//! appended to it:
//!
//! ```text
//! message<<ghadelimiter_8d1c...
//! ## Preview in LiveCodes
//! ...
//! ghadelimiter_8d1c...
//! ```
//!
//! Outside a workflow the value is printed to stdout instead.
//!
//! # Failure signal
//!
//! A run-level failure is written as a workflow `::error::` command.
//!
//! # Check listing
//!
//! ```text
//! 001 Demo
//!     Source: .livecodes/demo.json
//!     Shape: config
//!     Data URLs: yes
//! ```
//!
//! Each listing has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::project::Project;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use uuid::Uuid;

/// Environment variable naming the workflow output file.
pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";

/// Publish `value` under `name`.
pub fn set_output(name: &str, value: &str) -> io::Result<()> {
    match std::env::var_os(OUTPUT_FILE_VAR) {
        Some(path) if !path.is_empty() => write_output_file(Path::new(&path), name, value),
        _ => {
            println!("{value}");
            Ok(())
        }
    }
}

/// Append a named output entry to a workflow output file.
pub fn write_output_file(path: &Path, name: &str, value: &str) -> io::Result<()> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_output_entry(name, value, &delimiter).as_bytes())
}

/// Heredoc-style output entry.
pub fn format_output_entry(name: &str, value: &str, delimiter: &str) -> String {
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Workflow error command for a failed run.
pub fn format_failure(message: &str) -> String {
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}

pub fn print_failure(message: &str) {
    println!("{}", format_failure(message));
}

// ============================================================================
// Check listing
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// List loaded projects with their source, shape, and data-URL flag.
pub fn format_check_output(projects: &[Project]) -> Vec<String> {
    if projects.is_empty() {
        return vec!["No projects found".to_string()];
    }

    let mut lines = Vec::new();
    for (i, project) in projects.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), project.title));
        lines.push(format!("{}Source: {}", indent(1), project.source.display()));
        lines.push(format!("{}Shape: {}", indent(1), project.shape.label()));
        if project.has_data_urls {
            let upload = if project.shape.upload_candidate().is_some() {
                "yes (uploadable)"
            } else {
                "yes"
            };
            lines.push(format!("{}Data URLs: {upload}", indent(1)));
        }
    }
    lines.push(String::new());
    lines.push(format!("Found {} project(s)", projects.len()));
    lines
}

pub fn print_check_output(projects: &[Project]) {
    for line in format_check_output(projects) {
        println!("{}", line);
    }
}
