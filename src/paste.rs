//! Remote paste uploads for oversized configurations.
//!
//! A configuration with inlined `data:` URLs can make a playground link far
//! too long to share. Such configurations are stored on a paste service and
//! the link references the paste instead:
//!
//! ```text
//! {"config": {...large...}}   →   {"import": "id/AB12CD34"}
//! ```
//!
//! The service rate-limits clients to about one request per second, so every
//! upload goes through an [`UploadQueue`], which runs uploads one at a time
//! and enforces a minimum interval between consecutive calls.
//!
//! Upload failures are never fatal: the caller keeps the inlined
//! configuration and simply ends up with a longer link.

use crate::config::PasteSettings;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use thiserror::Error;
use ureq::Agent;

#[derive(Error, Debug)]
pub enum PasteError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Paste service responded with status {0}")]
    Status(u16),
    #[error("Paste service returned an empty response")]
    EmptyResponse,
}

/// A service that stores a configuration and returns its short identifier.
pub trait PasteService {
    fn upload(&self, config: &Map<String, Value>) -> Result<String, PasteError>;
}

/// Client for the dpaste.com API.
pub struct Dpaste {
    agent: Agent,
    endpoint: String,
    view_prefix: String,
    expiry_days: u32,
    user_agent: String,
}

impl Dpaste {
    pub fn from_settings(settings: &PasteSettings) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: settings.endpoint.clone(),
            view_prefix: settings.view_prefix.clone(),
            expiry_days: settings.expiry_days,
            user_agent: settings.user_agent.clone(),
        }
    }
}

impl PasteService for Dpaste {
    fn upload(&self, config: &Map<String, Value>) -> Result<String, PasteError> {
        let content = serde_json::to_string(config)?;
        let title = config.get("title").and_then(Value::as_str).unwrap_or("");
        let expiry_days = self.expiry_days.to_string();

        let response = self
            .agent
            .post(&self.endpoint)
            .header("User-Agent", &self.user_agent)
            .send_form([
                ("content", content.as_str()),
                ("title", title),
                ("syntax", "json"),
                ("expiry_days", expiry_days.as_str()),
            ])?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(PasteError::Status(status));
        }

        let body = response.into_body().read_to_string()?;
        let id = short_id(&body, &self.view_prefix);
        if id.is_empty() {
            return Err(PasteError::EmptyResponse);
        }
        Ok(id)
    }
}

/// Extract the paste identifier from the full paste URL the service returns.
///
/// `"https://dpaste.com/AB12CD34\n"` → `"AB12CD34"`
pub fn short_id(body: &str, view_prefix: &str) -> String {
    body.replacen(view_prefix, "", 1).trim().to_owned()
}

/// Serializes uploads and spaces them at least `min_interval` apart.
pub struct UploadQueue<'a> {
    service: &'a dyn PasteService,
    min_interval: Duration,
    last_upload: Option<Instant>,
}

impl<'a> UploadQueue<'a> {
    pub fn new(service: &'a dyn PasteService, min_interval: Duration) -> Self {
        Self {
            service,
            min_interval,
            last_upload: None,
        }
    }

    /// Upload one configuration, waiting out the interval since the previous
    /// upload first. Returns the paste identifier, or `None` on any failure.
    pub fn upload(&mut self, config: &Map<String, Value>) -> Option<String> {
        self.wait_turn();
        let result = self.service.upload(config);
        self.last_upload = Some(Instant::now());

        match result {
            Ok(id) => {
                tracing::info!(id = %id, "uploaded configuration");
                Some(id)
            }
            Err(e) => {
                tracing::debug!("paste upload failed, keeping inline configuration: {e}");
                None
            }
        }
    }

    fn wait_turn(&self) {
        if let Some(last) = self.last_upload {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
    }
}

/// Swap the inlined `config` for an `import` reference to a paste.
pub fn apply_upload(options: &mut Map<String, Value>, id: &str) {
    options.insert("import".to_owned(), Value::String(format!("id/{id}")));
    options.shift_remove("config");
}
