//! # LiveCodes Preview
//!
//! Generates shareable LiveCodes playground links for a repository's project
//! definition files and renders them as a markdown table, ready to be posted
//! as a pull request comment by a workflow.
//!
//! # Architecture: One Sequential Pipeline
//!
//! ```text
//! 1. Resolve   .livecodes/*.json  →  text        ({{LC::...}} directives)
//! 2. Load      text               →  Project     (parse + classify + title)
//! 3. Upload    Project            →  options     (oversized configs → paste id)
//! 4. Link      options            →  URL         (playground encoding)
//! 5. Render    links              →  markdown    (report table)
//! ```
//!
//! Everything runs once, in order, on a single thread. The only deliberate
//! pause is between paste uploads, which the remote service rate-limits.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`directive`] | `{{LC::SHA}}`, `TO_DATA_URL(...)`, `TO_URL(...)` substitution |
//! | [`naming`] | Project title derivation: config title → template → filename |
//! | [`project`] | Reads the projects directory and classifies each file |
//! | [`paste`] | Rate-limited uploads of oversized configurations |
//! | [`playground`] | Options → playground URL |
//! | [`report`] | Markdown report with commit header and link table |
//! | [`pipeline`] | Wires the stages together |
//! | [`config`] | Optional `livecodes-preview.toml` settings, merged over defaults |
//! | [`output`] | Workflow outputs, failure signal, and CLI listings |
//!
//! # Design Decisions
//!
//! ## Two Project Shapes, Decided Once
//!
//! A project file is either a bare editor configuration or a set of playground
//! options. The distinction is made a single time, when the file is loaded,
//! and carried as [`project::ProjectShape`]. Later stages match on the enum
//! instead of re-inspecting keys.
//!
//! ## Explicit Context
//!
//! Commit metadata and the base URL are read from the command line or
//! environment exactly once, in `main`, and passed down as an immutable
//! [`directive::DirectiveContext`]. Nothing below `main` touches the
//! environment, which keeps every stage deterministic under test.
//!
//! ## Fail Small
//!
//! One broken project file, one unreadable referenced asset, or one failed
//! upload never costs the whole report. Each is absorbed where it happens:
//! the file is skipped, the path text is kept, or the long inline link is
//! used. Only failures that make link building impossible end the run.

pub mod config;
pub mod directive;
pub mod naming;
pub mod output;
pub mod paste;
pub mod pipeline;
pub mod playground;
pub mod project;
pub mod report;

#[cfg(test)]
pub(crate) mod test_helpers;
