//! Project discovery and classification.
//!
//! Reads every entry of the projects directory, resolves its directives,
//! parses it as JSON and decides once, at load time, which of two shapes it
//! has:
//!
//! ```text
//! .livecodes/
//! ├── demo.json        {"title": "Demo", "markup": {...}}      → ProjectShape::Config
//! └── starter.json     {"template": "react", "view": "split"}  → ProjectShape::Options
//! ```
//!
//! An object is an [`ProjectShape::Options`] object when at least one of its
//! top-level keys is a recognized playground option ([`OPTION_KEYS`]);
//! anything else is a bare editor configuration.
//!
//! ## Failure isolation
//!
//! A file that cannot be read or parsed is logged and skipped; the rest of
//! the directory still loads. A missing or empty directory is logged too and
//! yields no projects.
//!
//! ## Ordering and collisions
//!
//! Entries are visited in filename order. Projects are keyed by their derived
//! title: a later file with the same title replaces the earlier project but
//! keeps its position.

use crate::directive::{self, DirectiveContext};
use crate::naming;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level keys that mark an object as playground options.
pub const OPTION_KEYS: &[&str] = &[
    "appUrl", "config", "params", "import", "template", "view", "lite", "loading",
];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON object in {0}")]
    NotAnObject(PathBuf),
}

/// The two shapes a project file can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectShape {
    /// Editor configuration only. Becomes the `config` option of the playground.
    Config(Map<String, Value>),
    /// Playground options (`template`, `view`, `config`, `import`, ...).
    Options(Map<String, Value>),
}

impl ProjectShape {
    /// Classify a parsed object against [`OPTION_KEYS`].
    pub fn classify(object: Map<String, Value>) -> Self {
        if object.keys().any(|key| is_option_key(key)) {
            ProjectShape::Options(object)
        } else {
            ProjectShape::Config(object)
        }
    }

    /// The editor configuration object, if there is one.
    pub fn config(&self) -> Option<&Map<String, Value>> {
        match self {
            ProjectShape::Config(config) => Some(config),
            ProjectShape::Options(options) => options.get("config").and_then(Value::as_object),
        }
    }

    /// `config.title` as display text. Numbers and `true` are written out;
    /// empty strings, `0`, `false`, `null`, arrays and objects give `None`.
    pub fn config_title(&self) -> Option<String> {
        match self.config()?.get("title")? {
            Value::String(title) if !title.is_empty() => Some(title.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Value::Bool(true) => Some("true".to_owned()),
            _ => None,
        }
    }

    /// The `template` option, if set.
    pub fn template(&self) -> Option<&str> {
        match self {
            ProjectShape::Config(_) => None,
            ProjectShape::Options(options) => options.get("template").and_then(Value::as_str),
        }
    }

    /// Configuration eligible to be replaced by a paste reference.
    ///
    /// Only a project whose sole playground option is an object `config`
    /// qualifies: a bare configuration, or an options object of the form
    /// `{"config": {...}}`.
    pub fn upload_candidate(&self) -> Option<&Map<String, Value>> {
        match self {
            ProjectShape::Config(config) => Some(config),
            ProjectShape::Options(options) => {
                let only_config = options
                    .keys()
                    .filter(|key| is_option_key(key))
                    .all(|key| key == "config");
                if only_config { self.config() } else { None }
            }
        }
    }

    /// Playground options for URL building. Bare configurations are wrapped
    /// as `{"config": <object>}`.
    pub fn into_options(self) -> Map<String, Value> {
        match self {
            ProjectShape::Config(config) => {
                let mut options = Map::new();
                options.insert("config".to_owned(), Value::Object(config));
                options
            }
            ProjectShape::Options(options) => options,
        }
    }

    /// Short label used in CLI listings.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectShape::Config(_) => "config",
            ProjectShape::Options(_) => "options",
        }
    }
}

fn is_option_key(key: &str) -> bool {
    OPTION_KEYS.contains(&key)
}

/// A loaded, resolved and classified project file.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub title: String,
    pub source: PathBuf,
    pub shape: ProjectShape,
    /// Raw text carried at least one `TO_DATA_URL` directive.
    pub has_data_urls: bool,
}

/// Load a single project file.
pub fn load_project(path: &Path, ctx: &DirectiveContext) -> Result<Project, LoadError> {
    let raw = fs::read_to_string(path)?;
    let has_data_urls = directive::contains_data_url_directive(&raw);
    let resolved = directive::resolve(&raw, ctx);

    let Value::Object(object) = serde_json::from_str::<Value>(&resolved)? else {
        return Err(LoadError::NotAnObject(path.to_path_buf()));
    };
    let shape = ProjectShape::classify(object);

    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let title = naming::derive_title(shape.config_title().as_deref(), shape.template(), &file_name);

    Ok(Project {
        title,
        source: path.to_path_buf(),
        shape,
        has_data_urls,
    })
}

/// Load every project in `root`, skipping (and logging) files that fail.
pub fn load_projects(root: &Path, ctx: &DirectiveContext) -> Vec<Project> {
    if !root.exists() {
        tracing::error!("Directory {} does not exist.", root.display());
    }

    let mut projects: IndexMap<String, Project> = IndexMap::new();
    for path in collect_entries(root) {
        match load_project(&path, ctx) {
            Ok(project) => {
                tracing::info!(
                    title = %project.title,
                    shape = project.shape.label(),
                    data_urls = project.has_data_urls,
                    "loaded {}",
                    path.display()
                );
                projects.insert(project.title.clone(), project);
            }
            Err(e) => tracing::error!("{}: {e}", path.display()),
        }
    }

    if projects.is_empty() {
        tracing::error!("No configuration files found in {}.", root.display());
    }

    projects.into_values().collect()
}

fn collect_entries(root: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(root) {
        Ok(read_dir) => read_dir.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    };
    entries.sort();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    // =========================================================================
    // Classification
    // =========================================================================

    #[test]
    fn object_without_option_keys_is_config() {
        let shape = ProjectShape::classify(object(json!({"title": "Foo", "markup": {}})));
        assert!(matches!(shape, ProjectShape::Config(_)));
    }

    #[test]
    fn each_option_key_marks_options() {
        for key in OPTION_KEYS {
            let mut map = Map::new();
            map.insert((*key).to_owned(), json!("x"));
            let shape = ProjectShape::classify(map);
            assert!(matches!(shape, ProjectShape::Options(_)), "key: {key}");
        }
    }

    #[test]
    fn empty_object_is_config() {
        assert!(matches!(
            ProjectShape::classify(Map::new()),
            ProjectShape::Config(_)
        ));
    }

    #[test]
    fn config_is_wrapped_into_options() {
        let shape = ProjectShape::classify(object(json!({"title": "Foo"})));
        assert_eq!(
            Value::Object(shape.into_options()),
            json!({"config": {"title": "Foo"}})
        );
    }

    #[test]
    fn options_pass_through_unchanged() {
        let raw = json!({"template": "react", "view": "split"});
        let shape = ProjectShape::classify(object(raw.clone()));
        assert_eq!(Value::Object(shape.into_options()), raw);
    }

    #[test]
    fn config_title_read_from_options_config() {
        let shape = ProjectShape::classify(object(json!({"config": {"title": "Nested"}})));
        assert_eq!(shape.config_title().as_deref(), Some("Nested"));
    }

    #[test]
    fn config_title_writes_out_numbers_and_true() {
        let shape = ProjectShape::classify(object(json!({"title": 42})));
        assert_eq!(shape.config_title().as_deref(), Some("42"));
        let shape = ProjectShape::classify(object(json!({"title": true})));
        assert_eq!(shape.config_title().as_deref(), Some("true"));
    }

    #[test]
    fn config_title_skips_falsy_and_structured_values() {
        for title in [json!(0), json!(false), json!(null), json!(""), json!(["a"]), json!({"a": 1})] {
            let shape = ProjectShape::classify(object(json!({"title": title})));
            assert_eq!(shape.config_title(), None);
        }
    }

    #[test]
    fn config_title_ignores_string_config() {
        let shape = ProjectShape::classify(object(json!({"config": "https://x.dev/c.json"})));
        assert_eq!(shape.config_title(), None);
    }

    #[test]
    fn upload_candidate_for_bare_config() {
        let shape = ProjectShape::classify(object(json!({"title": "Foo"})));
        assert!(shape.upload_candidate().is_some());
    }

    #[test]
    fn upload_candidate_for_config_only_options() {
        let shape = ProjectShape::classify(object(json!({"config": {"title": "Foo"}})));
        assert_eq!(
            shape.upload_candidate().and_then(|c| c.get("title")),
            Some(&json!("Foo"))
        );
    }

    #[test]
    fn no_upload_candidate_with_other_options() {
        let shape =
            ProjectShape::classify(object(json!({"config": {"title": "Foo"}, "view": "split"})));
        assert!(shape.upload_candidate().is_none());
    }

    #[test]
    fn no_upload_candidate_for_string_config() {
        let shape = ProjectShape::classify(object(json!({"config": "https://x.dev/c.json"})));
        assert!(shape.upload_candidate().is_none());
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn title_from_config_title() {
        let tmp = write_projects(&[("a.json", r#"{"title": "Foo"}"#)]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["Foo"]);
    }

    #[test]
    fn numeric_config_title_is_used_as_text() {
        let tmp = write_projects(&[("a.json", r#"{"config": {"title": 42}, "template": "vue"}"#)]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["42"]);
    }

    #[test]
    fn title_from_template() {
        let tmp = write_projects(&[("a.json", r#"{"template": "react-ts"}"#)]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["React Ts Template"]);
    }

    #[test]
    fn title_from_filename() {
        let tmp = write_projects(&[("todo-app.json", r#"{"markup": {"language": "html"}}"#)]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["todo-app"]);
    }

    #[test]
    fn unparsable_file_is_skipped() {
        let tmp = write_projects(&[
            ("a.json", r#"{"title": "Good"}"#),
            ("b.json", r#"{"title": "#),
            ("c.json", r#"[1, 2, 3]"#),
        ]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["Good"]);
    }

    #[test]
    fn non_object_json_is_an_error() {
        let tmp = write_projects(&[("list.json", "[]")]);
        let err = load_project(&projects_dir(&tmp).join("list.json"), &context_at(tmp.path()))
            .unwrap_err();
        assert!(matches!(err, LoadError::NotAnObject(_)));
    }

    #[test]
    fn subdirectory_is_skipped() {
        let tmp = write_projects(&[("a.json", r#"{"title": "Only"}"#)]);
        fs::create_dir(projects_dir(&tmp).join("nested")).unwrap();
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["Only"]);
    }

    #[test]
    fn files_load_in_name_order() {
        let tmp = write_projects(&[
            ("b.json", r#"{"title": "Second"}"#),
            ("a.json", r#"{"title": "First"}"#),
            ("c.json", r#"{"title": "Third"}"#),
        ]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn title_collision_last_file_wins_first_position_kept() {
        let tmp = write_projects(&[
            ("a.json", r#"{"title": "Same", "markup": {"content": "a"}}"#),
            ("b.json", r#"{"title": "Other"}"#),
            ("c.json", r#"{"title": "Same", "markup": {"content": "c"}}"#),
        ]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["Same", "Other"]);

        let same = find_project(&projects, "Same");
        assert!(same.source.ends_with("c.json"));
        assert_eq!(
            same.shape.config().and_then(|c| c.get("markup")),
            Some(&json!({"content": "c"}))
        );
    }

    #[test]
    fn missing_directory_yields_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let projects = load_projects(&tmp.path().join("absent"), &context_at(tmp.path()));
        assert!(projects.is_empty());
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let tmp = write_projects(&[]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert!(projects.is_empty());
    }

    #[test]
    fn data_url_flag_set_from_raw_text() {
        let tmp = write_projects(&[
            (
                "inline.json",
                r#"{"title": "Inline", "script": {"contentUrl": "{{LC::TO_DATA_URL('./app.js')}}"}}"#,
            ),
            ("plain.json", r#"{"title": "Plain"}"#),
        ]);
        fs::write(tmp.path().join("app.js"), "alert(1)").unwrap();
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));

        let inline = find_project(&projects, "Inline");
        assert!(inline.has_data_urls);
        let url = inline.shape.config().unwrap()["script"]["contentUrl"]
            .as_str()
            .unwrap();
        assert!(url.starts_with("data:"));

        assert!(!find_project(&projects, "Plain").has_data_urls);
    }

    #[test]
    fn commit_tokens_resolved_before_parsing() {
        let tmp = write_projects(&[("a.json", r#"{"title": "Build {{LC::SHA}}"}"#)]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        assert_eq!(project_titles(&projects), vec!["Build abc123"]);
    }

    #[test]
    fn key_order_preserved() {
        let tmp = write_projects(&[("a.json", r#"{"view": "split", "template": "vue", "lite": true}"#)]);
        let projects = load_projects(&projects_dir(&tmp), &context_at(tmp.path()));
        let keys: Vec<String> = projects[0].shape.clone().into_options().keys().cloned().collect();
        assert_eq!(keys, vec!["view", "template", "lite"]);
    }
}
