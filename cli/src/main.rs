//! CLI entrypoint for Story Weaver
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use weaver_application::StoryOrchestrator;
use weaver_domain::OutputFormat;
use weaver_infrastructure::{
    ConfigLoader, FileConfig, GeminiGateway, ImageExporter, JsonlStoryLogger,
};
use weaver_presentation::{
    Cli, FeedbackCues, OutputConfig, ReplConfig, StoryFormatter, StoryRepl, TurnSpinner,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!("{}", toml::to_string_pretty(&redacted(&config))?);
        return Ok(());
    }

    let _log_guard = init_tracing(cli.verbose, config.logging.log_file.as_deref())?;
    info!("Starting Story Weaver");

    let output = OutputConfig {
        format: cli
            .output
            .map(OutputFormat::from)
            .or(config.output.format)
            .unwrap_or_default(),
        color: config.output.color,
    };
    if !output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let settings = config.provider.to_settings()?;
    let gateway = Arc::new(GeminiGateway::new(settings)?);

    let mut orchestrator = StoryOrchestrator::new(gateway.clone(), gateway)
        .with_behavior(config.behavior_config());

    let transcript_dir = cli
        .transcript_dir
        .clone()
        .or_else(|| config.logging.transcript_dir.as_ref().map(PathBuf::from));
    if let Some(dir) = transcript_dir
        && let Some(logger) = JsonlStoryLogger::in_dir(&dir)
    {
        info!(path = %logger.path().display(), "Writing story transcript");
        orchestrator = orchestrator.with_logger(Arc::new(logger));
    }

    let image_dir = cli
        .image_dir
        .clone()
        .or_else(|| config.output.image_dir.as_ref().map(PathBuf::from));
    if let Some(dir) = image_dir {
        info!(dir = %dir.display(), "Saving illustrations");
        orchestrator = orchestrator.with_observer(Arc::new(ImageExporter::new(dir)));
    }

    if !cli.quiet && config.repl.show_progress {
        orchestrator = orchestrator.with_observer(Arc::new(TurnSpinner::new()));
    }

    // One-shot mode: opening segment only
    if cli.once {
        let opening = cli.opening.unwrap_or_default();
        return run_once(&orchestrator, &opening, output.format).await;
    }

    if !cli.no_cues && config.feedback.cues {
        orchestrator = orchestrator.with_observer(Arc::new(FeedbackCues::terminal()));
    }

    let repl = StoryRepl::new(Arc::new(orchestrator)).with_config(ReplConfig {
        history_file: config.repl.history_file.as_ref().map(PathBuf::from),
    });
    repl.run(cli.opening).await?;

    Ok(())
}

/// Generate the opening segment and print it in the requested format
async fn run_once(
    orchestrator: &StoryOrchestrator,
    opening: &str,
    format: OutputFormat,
) -> Result<()> {
    let result = orchestrator.start(opening).await;
    let snapshot = orchestrator.snapshot();

    match format {
        OutputFormat::Json => println!("{}", StoryFormatter::format_json(&snapshot)),
        OutputFormat::Text if result.is_ok() => print!("{}", StoryFormatter::format_turn(&snapshot)),
        OutputFormat::Text => {}
    }

    result?;
    Ok(())
}

/// Initialize tracing: `-v` count wins over `RUST_LOG`; output goes to
/// stderr, or to `log_file` when one is configured.
fn init_tracing(verbose: u8, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(log_file) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let path = Path::new(log_file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Invalid log file path: {}", log_file))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Configuration for display, with secrets masked
fn redacted(config: &FileConfig) -> FileConfig {
    let mut config = config.clone();
    if config.provider.api_key.is_some() {
        config.provider.api_key = Some("********".to_string());
    }
    config
}
