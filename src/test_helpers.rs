//! Shared test utilities for the livecodes-preview test suite.
//!
//! Provides fixture writers, lookup helpers that panic with a useful message,
//! and a recording [`MockPaste`] service.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = write_projects(&[("demo.json", r#"{"title": "Demo"}"#)]);
//! let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
//!
//! assert_eq!(project_titles(&projects), vec!["Demo"]);
//! let demo = find_project(&projects, "Demo");
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use serde_json::{Map, Value};
use tempfile::TempDir;

use crate::directive::DirectiveContext;
use crate::paste::{PasteError, PasteService};
use crate::project::Project;

// =========================================================================
// Fixture setup
// =========================================================================

/// Name of the projects directory created inside fixture temp dirs.
pub const PROJECTS_DIR: &str = ".livecodes";

/// Create a temp dir with a `.livecodes/` directory holding the given files.
pub fn write_projects(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(PROJECTS_DIR);
    std::fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
    tmp
}

/// The projects directory inside a fixture temp dir.
pub fn projects_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join(PROJECTS_DIR)
}

/// A directive context rooted at `root`, with fixed commit metadata.
pub fn context_at(root: &Path) -> DirectiveContext {
    DirectiveContext::new("abc123", "refs/heads/main", "octo/demo", "", root)
}

// =========================================================================
// Lookups
// =========================================================================

/// Find a project by title. Panics if not found.
pub fn find_project<'a>(projects: &'a [Project], title: &str) -> &'a Project {
    projects.iter().find(|p| p.title == title).unwrap_or_else(|| {
        let titles = project_titles(projects);
        panic!("project '{title}' not found. Available: {titles:?}")
    })
}

/// All project titles in load order.
pub fn project_titles(projects: &[Project]) -> Vec<&str> {
    projects.iter().map(|p| p.title.as_str()).collect()
}

// =========================================================================
// Paste service mock
// =========================================================================

/// Paste service that replays canned responses and records every call.
///
/// Responses are consumed front to back: `Some(id)` succeeds, `None` fails
/// with a 503. Once responses run out every call fails.
#[derive(Default)]
pub struct MockPaste {
    responses: Mutex<Vec<Option<String>>>,
    calls: Mutex<Vec<(Instant, Map<String, Value>)>>,
}

impl MockPaste {
    pub fn with_responses(responses: Vec<Option<String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    /// `title` of every uploaded configuration, in call order.
    pub fn uploaded_titles(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, config)| {
                config
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

impl PasteService for MockPaste {
    fn upload(&self, config: &Map<String, Value>) -> Result<String, PasteError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), config.clone()));

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(PasteError::Status(503));
        }
        responses.remove(0).ok_or(PasteError::Status(503))
    }
}
