//! Markdown report rendering.
//!
//! The report is a comment-ready markdown document:
//!
//! ```text
//! ## <logo> Preview in LiveCodes
//!
//! **Latest commit:** 1a2b3c4
//! **Last updated:** Oct 5, 2026 3:04pm (UTC)
//!
//! |  Project | Link |
//! |:-:|------------------------|
//! | **Demo** | [https://livecodes.io/?x=code/N4IgLgng...](https://livecodes.io/?x=code/...) |
//! ---
//! ```
//!
//! Rows keep the order of the input links. Long URLs are shortened in the
//! link text only; the link target is always the full URL.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const HEADER: &str = r#"## <a href="https://livecodes.io"><img alt="LiveCodes logo" src="https://livecodes.io/livecodes/assets/images/livecodes-logo.svg" width="32"></a> Preview in <a href="https://livecodes.io">LiveCodes</a>"#;

const FOOTER: &str =
    "_See [documentations](https://github.com/live-codes/preview-in-livecodes) for usage instructions._";

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaygroundLink {
    pub title: String,
    pub url: String,
}

/// Commit metadata shown in the report header.
#[derive(Debug, Clone, Default)]
pub struct CommitInfo {
    pub sha: String,
    /// Raw timestamp as provided by the environment.
    pub last_updated: Option<String>,
}

/// Render the full report document.
pub fn render_report(links: &[PlaygroundLink], commit: &CommitInfo, max_url_display: usize) -> String {
    let last_updated = commit
        .last_updated
        .as_deref()
        .map(format_last_updated)
        .unwrap_or_default();
    let rows: Vec<String> = links.iter().map(|link| format_row(link, max_url_display)).collect();

    format!(
        "\n{HEADER}\n\n**Latest commit:** {sha}  \n{last_updated}\n\n|  Project | Link |\n|:-:|------------------------|\n{rows}\n---\n\n{FOOTER}\n  ",
        sha = commit.sha,
        rows = rows.join("\n"),
    )
}

/// Format a table row for one link.
pub fn format_row(link: &PlaygroundLink, max_url_display: usize) -> String {
    format!(
        "| **{}** | [{}]({}) |",
        link.title,
        truncate_url(&link.url, max_url_display),
        link.url
    )
}

/// Truncate to `max` characters, appending `...` if truncated.
pub fn truncate_url(url: &str, max: usize) -> String {
    match url.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_string(),
    }
}

/// Format the "Last updated" line, or an empty string when the timestamp
/// is empty or cannot be parsed.
pub fn format_last_updated(raw: &str) -> String {
    match parse_timestamp(raw.trim()) {
        Some(date) => format!(
            "**Last updated:** {} (UTC)",
            date.format("%b %-d, %Y %-I:%M%P")
        ),
        None => String::new(),
    }
}

/// Parse a timestamp in one of the accepted formats, normalized to UTC.
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`
/// (taken as UTC) and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(date.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}
