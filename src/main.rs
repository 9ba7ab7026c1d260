//! YoJournal - AI-powered journal analyzer
//!
//! A CLI tool that runs journal entries through a set of Ollama-backed
//! analysis providers (emotions, psychoanalytic insight, personality),
//! keeps every aggregated result in a persistent history, and exports
//! that history as markdown.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (empty entry, provider failure, persistence, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod providers;
mod report;
mod scheduler;
mod settings;

use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use analysis::Orchestrator;
use cli::{Args, Command};
use config::Config;
use error::JournalError;
use providers::{
    AnalysisProvider, EmotionProvider, OllamaClient, PersonalityProvider, ProviderKind,
    PsychoanalysisProvider,
};
use report::{export_file_name, generate_history_document, render_record};
use scheduler::Debouncer;
use settings::{JsonFileStore, SettingsManager};

/// Starter content for a freshly created journal document.
const BLANK_JOURNAL_TEMPLATE: &str =
    "# AI Deep Self Discovery Journaling\n\nStart writing your journal entry here...\n";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    init_logging(&args);

    info!("YoJournal v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .yojournal.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".yojournal.toml");

    if path.exists() {
        eprintln!("⚠️  .yojournal.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .yojournal.toml")?;

    println!("✅ Created .yojournal.toml with default settings.");
    println!("   Edit it to customize the model, timings, and state path.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch a subcommand. Returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let state_path = PathBuf::from(&config.storage.state_path);
    let settings = Arc::new(
        SettingsManager::load(Box::new(JsonFileStore::new(state_path.clone())))
            .with_context(|| format!("Failed to load state from {}", state_path.display()))?,
    );

    match args.command.clone() {
        Command::Analyze { file } => run_analyze(&config, settings, &file).await,
        Command::Watch { file } => run_watch(&config, settings, &file).await,
        Command::New { name } => run_new(name),
        Command::Export { output } => run_export(settings, output).await,
        Command::Clear { yes } => run_clear(settings, yes).await,
        Command::Set { provider, state } => {
            settings.set_toggle(provider, state.as_bool()).await?;
            println!(
                "✅ {} analysis {}",
                provider,
                if state.as_bool() { "enabled" } else { "disabled" }
            );
            Ok(0)
        }
        // Handled before logging was initialized.
        Command::InitConfig => Ok(0),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .yojournal.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Wire the Ollama-backed providers into an orchestrator.
fn build_orchestrator(config: &Config, settings: Arc<SettingsManager>) -> Orchestrator {
    let client = OllamaClient::new(
        config.model.ollama_url.clone(),
        config.model.name.clone(),
        config.model.temperature,
        config.model.timeout_seconds,
    );

    let providers: Vec<Box<dyn AnalysisProvider>> = ProviderKind::all()
        .into_iter()
        .map(|kind| -> Box<dyn AnalysisProvider> {
            match kind {
                ProviderKind::Emotions => Box::new(EmotionProvider::new(client.clone())),
                ProviderKind::Psychoanalysis => {
                    Box::new(PsychoanalysisProvider::new(client.clone()))
                }
                ProviderKind::Personality => Box::new(PersonalityProvider::new(client.clone())),
            }
        })
        .collect();

    Orchestrator::new(settings, providers)
}

/// One-shot analysis of a journal entry file.
async fn run_analyze(
    config: &Config,
    settings: Arc<SettingsManager>,
    file: &Path,
) -> Result<i32> {
    if !file.exists() {
        eprintln!(
            "⚠️  No journal document found at {}. Please open or create one first.",
            file.display()
        );
        return Ok(1);
    }

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read journal entry: {}", file.display()))?;

    let orchestrator = build_orchestrator(config, settings.clone());

    println!("🔬 Analyzing journal entry: {}", file.display());
    match orchestrator.run(&text).await {
        Ok(record) => {
            if record.is_blank() {
                println!("ℹ️  All analyses are disabled; an empty record was saved.");
            } else {
                println!();
                print!("{}", render_record(&record));
            }
            println!(
                "✅ Analysis saved to history ({} records).",
                settings.history_len().await
            );
            Ok(0)
        }
        Err(JournalError::EmptyInput) => {
            eprintln!("⚠️  Journal entry is empty. Please write something first.");
            Ok(1)
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("❌ {}", e);
            Ok(1)
        }
    }
}

/// Watch a journal file and re-analyze it (debounced) on every change.
async fn run_watch(config: &Config, settings: Arc<SettingsManager>, file: &Path) -> Result<i32> {
    if !file.exists() {
        eprintln!(
            "⚠️  No journal document found at {}. Please create it first.",
            file.display()
        );
        return Ok(1);
    }

    let orchestrator = Arc::new(build_orchestrator(config, settings.clone()));
    let wait = Duration::from_millis(config.analysis.wait_ms);

    let action_orchestrator = orchestrator.clone();
    let action_file = file.to_path_buf();
    let debouncer = Debouncer::new(wait, move || {
        let orchestrator = action_orchestrator.clone();
        let file = action_file.clone();
        async move {
            analyze_watched_file(&orchestrator, &file).await;
        }
    });

    println!(
        "👀 Watching {} (debounce {} ms). Press Ctrl-C to stop.",
        file.display(),
        config.analysis.wait_ms
    );

    // Analyze the current content once, then follow modifications.
    debouncer.schedule();

    let mut poll = tokio::time::interval(Duration::from_millis(config.analysis.poll_interval_ms));
    let mut last_modified = modified_time(file);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let current = modified_time(file);
                if current != last_modified {
                    last_modified = current;
                    debug!("Journal file changed, scheduling analysis");
                    debouncer.schedule();
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n👋 Stopping watch.");
                break;
            }
        }
    }

    debouncer.shutdown().await;
    Ok(0)
}

/// The debounced action of watch mode: read, analyze, report.
async fn analyze_watched_file(orchestrator: &Orchestrator, file: &Path) {
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {}: {}", file.display(), e);
            eprintln!("⚠️  Could not read {}: {}", file.display(), e);
            return;
        }
    };

    match orchestrator.run(&text).await {
        Ok(record) => {
            if record.is_blank() {
                println!("ℹ️  All analyses are disabled; an empty record was saved.");
            } else {
                println!();
                print!("{}", render_record(&record));
            }
        }
        Err(JournalError::EmptyInput) => {
            eprintln!("⚠️  Journal entry is empty, skipping analysis.");
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("❌ {}", e);
        }
    }
}

/// Create a blank journal document. Immediate, never debounced.
fn run_new(name: Option<PathBuf>) -> Result<i32> {
    let path = name
        .unwrap_or_else(|| PathBuf::from(format!("Journal_{}.md", Local::now().format("%Y-%m-%d"))));

    if path.exists() {
        eprintln!("⚠️  {} already exists.", path.display());
        return Ok(1);
    }

    std::fs::write(&path, BLANK_JOURNAL_TEMPLATE)
        .with_context(|| format!("Failed to create journal document: {}", path.display()))?;

    println!("✅ Created blank journal document: {}", path.display());
    Ok(0)
}

/// Export the analysis history as a dated markdown document.
async fn run_export(settings: Arc<SettingsManager>, output: Option<PathBuf>) -> Result<i32> {
    let history = settings.snapshot().await.analysis_history;

    let content = match generate_history_document(&history) {
        Ok(content) => content,
        Err(JournalError::NothingToExport) => {
            println!("ℹ️  No analysis history to export.");
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name()));
    std::fs::write(&path, &content)
        .map_err(|e| JournalError::Export(anyhow::Error::new(e)))
        .with_context(|| format!("while writing {}", path.display()))?;

    println!(
        "✅ Analysis history exported to {} ({} records).",
        path.display(),
        history.len()
    );
    Ok(0)
}

/// Clear the analysis history. Gated by an explicit confirmation flag.
async fn run_clear(settings: Arc<SettingsManager>, yes: bool) -> Result<i32> {
    if !yes {
        eprintln!("⚠️  This erases all previous analyses and cannot be undone.");
        eprintln!("   Re-run with --yes to confirm.");
        return Ok(1);
    }

    settings.clear_history().await?;
    println!("✅ Analysis history cleared.");
    Ok(0)
}

/// Last modification time of the watched file, if readable.
fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
