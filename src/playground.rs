//! Playground URL encoding.
//!
//! Turns a project's final options object into a shareable LiveCodes link.
//! Options map onto query parameters in key order:
//!
//! | Option | Query |
//! |--------|-------|
//! | `appUrl` | used as the base URL, not emitted |
//! | `params` (object) | one pair per entry |
//! | `config` (string) | `config=<url>` |
//! | `config` (non-empty object) | `x=code/<lz-string compressed JSON>` |
//! | `import` | `x=<value>` |
//! | anything else | `<key>=<value>` |
//!
//! Pairs are form-urlencoded, after which every `%2F` is turned back into `/`
//! so paths such as `x=id/AB12` stay readable.

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// Playground used when neither the project nor the settings name one.
pub const DEFAULT_APP_URL: &str = "https://livecodes.io/";

#[derive(Error, Debug)]
pub enum PlaygroundError {
    #[error("Invalid appUrl '{url}': {source}")]
    InvalidAppUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Build the shareable link for an options object.
///
/// `default_app_url` applies when the options carry no `appUrl`.
pub fn build_url(
    options: &Map<String, Value>,
    default_app_url: Option<&str>,
) -> Result<String, PlaygroundError> {
    let url = playground_url(options, default_app_url)?;
    Ok(normalize_separators(&url))
}

/// Encode options into a playground URL, without separator normalization.
pub fn playground_url(
    options: &Map<String, Value>,
    default_app_url: Option<&str>,
) -> Result<String, PlaygroundError> {
    let app_url = options
        .get("appUrl")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or(default_app_url)
        .unwrap_or(DEFAULT_APP_URL);

    let mut url = Url::parse(app_url).map_err(|source| PlaygroundError::InvalidAppUrl {
        url: app_url.to_owned(),
        source,
    })?;

    let pairs = query_pairs(options);
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(&pairs);
    }
    Ok(url.into())
}

/// Rewrite encoded path separators back to `/`.
pub fn normalize_separators(url: &str) -> String {
    url.replace("%2F", "/")
}

fn query_pairs(options: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in options {
        match key.as_str() {
            "appUrl" => {}
            "params" => {
                if let Value::Object(params) = value {
                    pairs.extend(
                        params
                            .iter()
                            .filter_map(|(k, v)| query_value(v).map(|v| (k.clone(), v))),
                    );
                }
            }
            "config" => match value {
                Value::String(url) => pairs.push(("config".to_owned(), url.clone())),
                Value::Object(config) if !config.is_empty() => {
                    pairs.push(("x".to_owned(), encode_config(value)))
                }
                _ => {}
            },
            "import" => {
                if let Some(v) = query_value(value) {
                    pairs.push(("x".to_owned(), v));
                }
            }
            _ => {
                if let Some(v) = query_value(value) {
                    pairs.push((key.clone(), v));
                }
            }
        }
    }
    pairs
}

/// `String(value)` semantics: strings raw, null skipped, everything else as JSON.
fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn encode_config(config: &Value) -> String {
    format!(
        "code/{}",
        lz_str::compress_to_encoded_uri_component(config.to_string().as_str())
    )
}
