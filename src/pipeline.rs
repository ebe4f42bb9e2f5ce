//! The full preview run: load → upload → link → render.
//!
//! ```text
//! .livecodes/*  ──load──▶  Vec<Project>  ──upload?──▶  options  ──encode──▶  links  ──▶  markdown
//! ```
//!
//! Per-project problems (unparsable files, failed uploads) are absorbed by the
//! stage that hits them. Only an error that prevents building a link at all,
//! such as an unparsable `appUrl`, ends the run as a [`PipelineError`].

use crate::config::{ConfigError, Settings};
use crate::directive::DirectiveContext;
use crate::paste::{self, PasteService, UploadQueue};
use crate::playground::{self, PlaygroundError};
use crate::project::{self, Project};
use crate::report::{self, CommitInfo, PlaygroundLink};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Playground(#[from] PlaygroundError),
}

/// Result of a complete run.
#[derive(Debug)]
pub struct Preview {
    pub links: Vec<PlaygroundLink>,
    pub markdown: String,
}

/// Run the whole pipeline. `paste` is `None` when uploads are disabled.
///
/// `settings` are validated first, so the upload interval can never drop
/// below the paste service's rate limit.
pub fn run(
    settings: &Settings,
    ctx: &DirectiveContext,
    commit: &CommitInfo,
    paste: Option<&dyn PasteService>,
) -> Result<Preview, PipelineError> {
    settings.validate()?;
    let projects = project::load_projects(Path::new(&settings.projects_root), ctx);

    let mut queue = paste.map(|service| UploadQueue::new(service, settings.paste.min_interval()));
    let links = build_links(projects, queue.as_mut(), settings.app_url.as_deref())?;

    let markdown = report::render_report(&links, commit, settings.report.max_url_display);
    Ok(Preview { links, markdown })
}

/// Turn loaded projects into links, uploading eligible configurations first.
///
/// A project is uploaded when its raw text inlined data URLs and its only
/// playground option is an object `config`. Uploads happen in project order,
/// one at a time.
pub fn build_links(
    projects: Vec<Project>,
    mut uploads: Option<&mut UploadQueue<'_>>,
    default_app_url: Option<&str>,
) -> Result<Vec<PlaygroundLink>, PlaygroundError> {
    let mut links = Vec::with_capacity(projects.len());

    for project in projects {
        let paste_id = match (project.has_data_urls, uploads.as_deref_mut()) {
            (true, Some(queue)) => project
                .shape
                .upload_candidate()
                .and_then(|config| queue.upload(config)),
            _ => None,
        };

        let mut options = project.shape.into_options();
        if let Some(id) = paste_id {
            paste::apply_upload(&mut options, &id);
        }

        let url = playground::build_url(&options, default_app_url)?;
        tracing::info!(title = %project.title, "built playground link");
        links.push(PlaygroundLink {
            title: project.title,
            url,
        });
    }

    Ok(links)
}
