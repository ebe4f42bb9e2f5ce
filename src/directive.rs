//! Placeholder directive resolution.
//!
//! Project files may embed `{{ LC::OP }}` tokens that are rewritten before the
//! text is parsed as JSON. Two families exist:
//!
//! ```text
//! {{ LC::SHA }}   {{ LC::REF }}   {{ LC::REPO }}          commit metadata
//! {{ LC::TO_DATA_URL('./src/app.js') }}                    file → data: URL
//! {{ LC::TO_URL("./src/app.js") }}                         file → absolute URL
//! ```
//!
//! Whitespace is tolerated inside the braces, around `::`, and around the
//! argument. The argument may be quoted with `'` or `"` or left bare, and a
//! leading `./` or `.\` is stripped before lookup.
//!
//! ## Ordering
//!
//! Commit tokens are always substituted first, over the whole text. Only then
//! are `TO_DATA_URL` and `TO_URL` scanned, so a path assembled from commit
//! tokens resolves against the substituted value. Every occurrence is replaced.
//!
//! ## Fallbacks
//!
//! Resolution never fails. An unreadable or empty file inlines as the bare path
//! text, and a `TO_URL` without a base URL (or with one that cannot be joined)
//! also yields the bare path. Fallbacks are reported at `debug` level only, so
//! output is identical whether or not diagnostics are enabled.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::{Captures, Regex};
use std::path::PathBuf;
use std::sync::LazyLock;
use url::Url;

/// MIME type used when the file extension is not recognized.
pub const DEFAULT_MIME: &str = "text/javascript";

static COMMIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*LC\s*::\s*(SHA|REF|REPO)\s*\}\}").expect("invalid commit directive regex")
});

static DATA_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| file_directive_pattern("TO_DATA_URL"));

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| file_directive_pattern("TO_URL"));

/// Pattern for a directive taking a single (optionally quoted) path argument.
fn file_directive_pattern(op: &str) -> Regex {
    Regex::new(&format!(
        r#"\{{\{{\s*LC\s*::\s*{op}\s*\(\s*['"]?(?:\.[/\\])?([^)'"]+?)\s*['"]?\s*\)\s*\}}\}}"#
    ))
    .expect("invalid file directive regex")
}

/// Fixed substitution context shared by every project of a run.
///
/// Built once at startup and passed explicitly, never read from the
/// environment during resolution.
#[derive(Debug, Clone, Default)]
pub struct DirectiveContext {
    pub sha: String,
    pub git_ref: String,
    pub repo: String,
    /// Base for `TO_URL`, with commit tokens already substituted.
    /// `None` when unset or empty after substitution.
    pub base_url: Option<String>,
    /// Directory `TO_DATA_URL` paths are read relative to.
    pub root: PathBuf,
}

impl DirectiveContext {
    /// Build a context, substituting commit tokens inside `base_url` itself.
    pub fn new(
        sha: impl Into<String>,
        git_ref: impl Into<String>,
        repo: impl Into<String>,
        base_url: &str,
        root: impl Into<PathBuf>,
    ) -> Self {
        let mut ctx = Self {
            sha: sha.into(),
            git_ref: git_ref.into(),
            repo: repo.into(),
            base_url: None,
            root: root.into(),
        };
        let base = substitute_commit_refs(base_url, &ctx);
        ctx.base_url = Some(base).filter(|b| !b.is_empty());
        ctx
    }
}

/// Replace every `SHA`, `REF` and `REPO` token.
pub fn substitute_commit_refs(text: &str, ctx: &DirectiveContext) -> String {
    COMMIT_PATTERN
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "SHA" => ctx.sha.clone(),
            "REF" => ctx.git_ref.clone(),
            _ => ctx.repo.clone(),
        })
        .into_owned()
}

/// Resolve every recognized directive in `text`.
///
/// Text without directives is returned unchanged.
pub fn resolve(text: &str, ctx: &DirectiveContext) -> String {
    let text = substitute_commit_refs(text, ctx);
    let text = DATA_URL_PATTERN
        .replace_all(&text, |caps: &Captures| inline_file(caps[1].trim(), ctx))
        .into_owned();
    URL_PATTERN
        .replace_all(&text, |caps: &Captures| absolute_url(caps[1].trim(), ctx))
        .into_owned()
}

/// Whether raw (unresolved) text carries at least one `TO_DATA_URL` directive.
pub fn contains_data_url_directive(raw: &str) -> bool {
    DATA_URL_PATTERN.is_match(raw)
}

/// Guess a MIME type from a path's extension.
pub fn mime_type(path: &str) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or(DEFAULT_MIME)
}

/// Encode bytes as a base64 `data:` URL.
pub fn to_data_url(content: &[u8], mime: &str) -> String {
    format!(
        "data:{mime};charset=UTF-8;base64,{}",
        BASE64_STANDARD.encode(content)
    )
}

fn inline_file(path: &str, ctx: &DirectiveContext) -> String {
    match std::fs::read(ctx.root.join(path)) {
        Ok(content) if !content.is_empty() => to_data_url(&content, mime_type(path)),
        Ok(_) => {
            tracing::debug!(path, "TO_DATA_URL target is empty, keeping path");
            path.to_owned()
        }
        Err(e) => {
            tracing::debug!(path, "TO_DATA_URL target unreadable, keeping path: {e}");
            path.to_owned()
        }
    }
}

fn absolute_url(path: &str, ctx: &DirectiveContext) -> String {
    let Some(base) = ctx.base_url.as_deref() else {
        return path.to_owned();
    };
    match Url::parse(base).and_then(|base| base.join(path)) {
        Ok(url) => url.into(),
        Err(e) => {
            tracing::debug!(path, base, "TO_URL resolution failed, keeping path: {e}");
            path.to_owned()
        }
    }
}
