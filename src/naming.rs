//! Project title derivation.
//!
//! Every project file yields one display title, the first non-empty of:
//!
//! 1. `config.title`: an explicit title set in the project's configuration
//! 2. the starter template name: `react-ts` → "React Ts Template"
//! 3. the filename with its extension stripped: `todo-app.json` → "todo-app"
//!
//! Titles are also the keys under which projects collapse, so two files
//! resolving to the same title produce a single report row.

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title for a starter template name.
///
/// - `"react-ts"` → `Some("React Ts Template")`
/// - `"vanilla"` → `Some("Vanilla Template")`
/// - `""` → `None`
pub fn starter_title(template: &str) -> Option<String> {
    if template.is_empty() {
        return None;
    }
    let words: Vec<String> = template.split('-').map(capitalize).collect();
    Some(format!("{} Template", words.join(" ")))
}

/// Strip the last extension from a filename.
///
/// - `"demo.json"` → `"demo"`
/// - `"demo.config.json"` → `"demo.config"`
/// - `"demo"` → `"demo"`
/// - `".hidden"` → `".hidden"`
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => &file_name[..pos],
        _ => file_name,
    }
}

/// Resolve a project title from its sources, in priority order.
pub fn derive_title(config_title: Option<&str>, template: Option<&str>, file_name: &str) -> String {
    if let Some(title) = config_title.filter(|t| !t.is_empty()) {
        return title.to_owned();
    }
    if let Some(title) = template.and_then(starter_title) {
        return title;
    }
    strip_extension(file_name).to_owned()
}
