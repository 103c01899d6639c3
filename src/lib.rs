pub mod assistant;
pub mod commands;
pub mod engine;
pub mod llm;
pub mod preview;
pub mod workspace;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::AppState;
use crate::engine::Playground;
use crate::llm::{CompletionService, GeminiClient, UnconfiguredService};
use crate::preview::FileSurface;
use crate::workspace::TemplateCatalog;

pub fn cli() -> Command {
    Command::new("clientex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Sandboxed live preview with AI code review")
        .arg(
            Arg::new("template")
                .long("template")
                .help("Template to start from (defaults to the first in the catalog)"),
        )
        .arg(
            Arg::new("templates")
                .long("templates")
                .value_parser(value_parser!(PathBuf))
                .help("TOML template catalog to use instead of the built-in one"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .default_value("preview.html")
                .value_parser(value_parser!(PathBuf))
                .help("Where the sandboxed preview page is written"),
        )
        .arg(
            Arg::new("list-templates")
                .long("list-templates")
                .action(ArgAction::SetTrue)
                .help("Print the template catalog and exit"),
        )
        .arg(
            Arg::new("analyze")
                .long("analyze")
                .action(ArgAction::SetTrue)
                .help("Ask the assistant to review the sources"),
        )
        .arg(
            Arg::new("apply")
                .long("apply")
                .requires("analyze")
                .value_parser(value_parser!(usize))
                .help("Apply the suggestion at this index after analysis"),
        )
        .arg(
            Arg::new("prompt")
                .long("prompt")
                .help("Free-form request for the assistant"),
        )
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub template: Option<String>,
    pub templates: Option<PathBuf>,
    pub out: PathBuf,
    pub list_templates: bool,
    pub analyze: bool,
    pub apply: Option<usize>,
    pub prompt: Option<String>,
}

impl RunOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            template: matches.get_one::<String>("template").cloned(),
            templates: matches.get_one::<PathBuf>("templates").cloned(),
            out: matches
                .get_one::<PathBuf>("out")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("preview.html")),
            list_templates: matches.get_flag("list-templates"),
            analyze: matches.get_flag("analyze"),
            apply: matches.get_one::<usize>("apply").copied(),
            prompt: matches.get_one::<String>("prompt").cloned(),
        }
    }
}

/// Logs go to stderr so stdout stays clean for command output. `RUST_LOG` overrides the default level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn completion_service() -> (Arc<dyn CompletionService>, String) {
    match GeminiClient::from_env() {
        Ok(client) => {
            let model = client.config().model.clone();
            info!(model = %model, "Completion service configured");
            let service: Arc<dyn CompletionService> = Arc::new(client);
            (service, model)
        }
        Err(e) => {
            warn!(error = %e, "Completion service unavailable; analysis will report the error");
            let service: Arc<dyn CompletionService> = Arc::new(UnconfiguredService::new(e.to_string()));
            let model = std::env::var("MODEL").unwrap_or_else(|_| llm::DEFAULT_MODEL.to_string());
            (service, model)
        }
    }
}

pub async fn run(options: RunOptions) -> anyhow::Result<()> {
    let catalog = match &options.templates {
        Some(path) => TemplateCatalog::from_path(path)
            .with_context(|| format!("loading template catalog {}", path.display()))?,
        None => TemplateCatalog::builtin().context("loading built-in templates")?,
    };

    if options.list_templates {
        for summary in catalog.summaries() {
            println!("{}\t{}", summary.id, summary.name);
        }
        return Ok(());
    }

    let (service, model) = completion_service();
    let surface = Arc::new(FileSurface::new(&options.out));
    let state = AppState::new(Playground::new(Arc::new(catalog), surface, service, model));

    if let Some(id) = &options.template {
        let message = commands::select_template(id.clone(), &state)
            .await
            .map_err(anyhow::Error::msg)?;
        info!("{}", message);
    }

    let document = commands::render_preview(&state)
        .await
        .map_err(anyhow::Error::msg)?;
    info!(revision = document.revision, out = %options.out.display(), "Preview written");

    if options.analyze {
        let view = commands::analyze_code(&state)
            .await
            .map_err(anyhow::Error::msg)?;
        println!("{}", view);

        if let Some(index) = options.apply {
            let message = commands::apply_suggestion(index, &state)
                .await
                .map_err(anyhow::Error::msg)?;
            println!("{}", message);
            let document = commands::render_preview(&state)
                .await
                .map_err(anyhow::Error::msg)?;
            info!(revision = document.revision, "Preview refreshed");
        }
    }

    if let Some(prompt) = options.prompt {
        let message = commands::submit_prompt(prompt, &state)
            .await
            .map_err(anyhow::Error::msg)?;
        println!("{}", message);
    }

    Ok(())
}
