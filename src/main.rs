use clap::{Parser, Subcommand};
use livecodes_preview::config::{self, Settings};
use livecodes_preview::directive::DirectiveContext;
use livecodes_preview::paste::{Dpaste, PasteService};
use livecodes_preview::pipeline::{self, PipelineError};
use livecodes_preview::report::CommitInfo;
use livecodes_preview::{output, project};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Commit metadata, normally provided by the workflow environment.
#[derive(clap::Args, Clone)]
struct CommitArgs {
    /// Commit SHA substituted for {{LC::SHA}}
    #[arg(long, env = "SHA", default_value = "", global = true)]
    sha: String,

    /// Git ref substituted for {{LC::REF}}
    #[arg(long = "ref", env = "REF", default_value = "", global = true)]
    git_ref: String,

    /// Repository (owner/name) substituted for {{LC::REPO}}
    #[arg(long, env = "REPO", default_value = "", global = true)]
    repo: String,

    /// Base URL for {{LC::TO_URL(...)}}; may itself contain SHA/REF/REPO tokens
    #[arg(long, env = "BASE_URL", default_value = "", global = true)]
    base_url: String,

    /// Commit timestamp shown as "Last updated"
    #[arg(long, env = "LAST_UPDATED", default_value = "", global = true)]
    last_updated: String,
}

/// Flags for commands that may upload to the paste service.
#[derive(clap::Args, Clone, Default)]
struct UploadArgs {
    /// Never upload; keep inlined configurations in the links
    #[arg(long)]
    no_upload: bool,
}

#[derive(Parser)]
#[command(name = "livecodes-preview")]
#[command(version)]
#[command(about = "Generate LiveCodes preview links for project definition files")]
#[command(long_about = "\
Generate LiveCodes preview links for project definition files

Every file in the projects directory (default .livecodes/) is one project.
Files are JSON, either a bare LiveCodes configuration or a set of playground
options (appUrl, config, params, import, template, view, lite, loading).

Directives resolved before parsing:
  {{LC::SHA}} {{LC::REF}} {{LC::REPO}}   commit metadata
  {{LC::TO_DATA_URL('./src/app.js')}}    file contents as a data: URL
  {{LC::TO_URL('./src/app.js')}}         file path resolved against BASE_URL

Project titles (first available wins):
  config.title → template name (\"react-ts\" → \"React Ts Template\") → filename

The markdown report is written to the workflow output named \"message\"
(or stdout outside a workflow).

Run 'livecodes-preview gen-config' to generate a documented settings file.")]
struct Cli {
    /// Settings file (optional)
    #[arg(long, default_value = "livecodes-preview.toml", global = true)]
    config: PathBuf,

    /// Projects directory (overrides projects_root from the settings file)
    #[arg(long, global = true)]
    projects: Option<PathBuf>,

    /// Log progress at info level (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    commit: CommitArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve, upload, link, and publish the report (default)
    Build(UploadArgs),
    /// Load and classify projects without uploading or publishing
    Check,
    /// Print a stock settings file with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_failure(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout stays free for the report and workflow commands.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let Cli {
        config: config_path,
        projects,
        commit,
        command,
        ..
    } = cli;

    match command.unwrap_or_else(|| Command::Build(UploadArgs::default())) {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Check => {
            let settings = load_settings(&config_path, projects)?;
            let ctx = directive_context(&commit);
            let projects = project::load_projects(Path::new(&settings.projects_root), &ctx);
            output::print_check_output(&projects);
        }
        Command::Build(upload_args) => {
            let settings = load_settings(&config_path, projects)?;
            let ctx = directive_context(&commit);
            let commit_info = CommitInfo {
                sha: commit.sha.clone(),
                last_updated: Some(commit.last_updated.clone()).filter(|s| !s.is_empty()),
            };

            let dpaste = Dpaste::from_settings(&settings.paste);
            let paste: Option<&dyn PasteService> =
                (settings.paste.enabled && !upload_args.no_upload).then_some(&dpaste as &dyn PasteService);

            let preview = pipeline::run(&settings, &ctx, &commit_info, paste)?;
            output::set_output(&settings.report.output_name, &preview.markdown)?;
        }
    }

    Ok(())
}

fn load_settings(path: &Path, projects: Option<PathBuf>) -> Result<Settings, PipelineError> {
    let mut settings = config::load_config(path)?;
    if let Some(dir) = projects {
        settings.projects_root = dir.to_string_lossy().to_string();
    }
    Ok(settings)
}

/// Directive context rooted at the working directory.
fn directive_context(commit: &CommitArgs) -> DirectiveContext {
    DirectiveContext::new(
        commit.sha.as_str(),
        commit.git_ref.as_str(),
        commit.repo.as_str(),
        &commit.base_url,
        ".",
    )
}
