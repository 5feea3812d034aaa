//! Background removal studio CLI
//!
//! Every input file is dropped into one session, one after another. A
//! completed drop is downloaded into the output directory and the session is
//! reset; a failed drop leaves its banner and the next drop restarts.

use super::config::CliConfigBuilder;
use crate::{
    backends::CommandRemover,
    config::StudioConfig,
    error::SubmitRefusal,
    intake::ImageFile,
    remover::BackgroundRemover,
    services::{ConsoleObserver, PROGRESS_MESSAGE},
    session::RemovalSession,
    tracing_config::{init_cli_tracing, spans},
    types::ProcessingStatus,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Background removal studio
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgremove-studio")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image files, directories or glob patterns
    #[arg(value_name = "INPUT", required_unless_present = "show_config")]
    pub input: Vec<String>,

    /// Directory that receives downloaded results
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Search directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// File name pattern for directory inputs (e.g., "*.jpg")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Background removal program [default: from config, else imgly-bgremove]
    #[arg(long, value_name = "PROGRAM")]
    pub remover: Option<String>,

    /// Extra argument for the removal program (repeatable)
    #[arg(long = "remover-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub remover_arg: Vec<String>,

    /// Do not ask the removal program for diagnostic output
    #[arg(long)]
    pub no_diagnostics: bool,

    /// Let the removal program keep its resources cached between images
    #[arg(long)]
    pub no_eager_release: bool,

    /// Print the session view as JSON after each drop
    #[arg(long)]
    pub json: bool,

    /// Configuration file [default: <config dir>/bgremove-studio/config.json]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Counters for one CLI run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    pub rejected: usize,
}

impl RunSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.completed + self.failed + self.rejected
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    if cli.show_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let inputs = collect_inputs(&cli, &config)?;
    if inputs.is_empty() {
        anyhow::bail!("No image files found in the provided inputs");
    }

    let remover: Arc<dyn BackgroundRemover> = Arc::new(CommandRemover::from_config(&config.remover));
    let summary = process_inputs(&cli, &config, remover, &inputs).await?;

    if summary.completed == 0 {
        anyhow::bail!("No image was processed ({} failed, {} rejected)", summary.failed, summary.rejected);
    }
    Ok(())
}

/// Drop every input into one session and save each completed result
pub async fn process_inputs(
    cli: &Cli,
    config: &StudioConfig,
    remover: Arc<dyn BackgroundRemover>,
    inputs: &[PathBuf],
) -> Result<RunSummary> {
    let span = spans::batch(inputs.len(), remover.name());
    drop_all(cli, config, remover, inputs).instrument(span).await
}

async fn drop_all(
    cli: &Cli,
    config: &StudioConfig,
    remover: Arc<dyn BackgroundRemover>,
    inputs: &[PathBuf],
) -> Result<RunSummary> {
    let observer = Arc::new(ConsoleObserver::new(cli.verbose > 0));
    let mut session = RemovalSession::new(remover, config).with_observer(observer);
    let mut summary = RunSummary::default();
    let batch_start = Instant::now();

    info!("Found {} image file(s) to process", inputs.len());

    for path in inputs {
        let file = match ImageFile::from_path(path) {
            Ok(file) => file,
            Err(e) => {
                error!("❌ Failed to read {}: {}", path.display(), e);
                summary.failed += 1;
                continue;
            },
        };

        let pending = match session.begin(vec![file]) {
            Ok(pending) => pending,
            Err(SubmitRefusal::Rejected(rejection)) => {
                log::debug!("Skipped {}: {}", path.display(), rejection);
                if cli.json {
                    println!("{}", serde_json::to_string(&session.view())?);
                }
                summary.rejected += 1;
                continue;
            },
            Err(SubmitRefusal::Busy) => {
                anyhow::bail!("Session is still processing a previous image");
            },
        };

        let spinner = processing_spinner(path);
        let outcome = pending.run().instrument(spans::drop_file(path)).await;
        spinner.finish_and_clear();

        let status = session.finish(outcome);
        if cli.json {
            println!("{}", serde_json::to_string(&session.view())?);
        }

        match status {
            ProcessingStatus::Complete => {
                let saved = session
                    .download()
                    .and_then(|artifact| artifact.save_into(&cli.output))
                    .with_context(|| format!("Failed to save result for {}", path.display()))?;
                info!("💾 {} → {}", path.display(), saved.display());
                session.reset()?;
                summary.completed += 1;
            },
            ProcessingStatus::Error => {
                if !cli.json {
                    eprint!("{}", session.view());
                }
                summary.failed += 1;
            },
            other => {
                warn!("Unexpected status {} after {}", other, path.display());
                summary.failed += 1;
            },
        }
    }

    let elapsed = batch_start.elapsed();
    if summary.total() > 1 {
        info!("📊 Summary:");
        info!("  ├─ Completed: {}", summary.completed);
        info!("  ├─ Failed: {}", summary.failed);
        info!("  ├─ Rejected: {}", summary.rejected);
        info!("  └─ Total time: {:.2}s", elapsed.as_secs_f64());
    }

    Ok(summary)
}

fn processing_spinner(path: &Path) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    spinner.set_message(format!("{}: {}", name, PROGRESS_MESSAGE));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Resolve inputs into a sorted list of files.
///
/// Explicit files are kept as given so the intake policy can refuse them;
/// directories and glob patterns are filtered by the accepted extensions.
pub fn collect_inputs(cli: &Cli, config: &StudioConfig) -> Result<Vec<PathBuf>> {
    let extensions = &config.intake.extensions;
    let mut files = Vec::new();

    for input in &cli.input {
        let path = PathBuf::from(input);
        if path.is_file() {
            files.push(path);
        } else if path.is_dir() {
            files.extend(find_image_files(&path, cli.recursive, cli.pattern.as_deref(), extensions)?);
        } else if is_glob(input) {
            for entry in glob::glob(input).with_context(|| format!("Invalid glob pattern '{}'", input))? {
                let entry = entry?;
                if entry.is_file() && is_image_file(&entry, extensions) {
                    files.push(entry);
                }
            }
        } else {
            anyhow::bail!(
                "Input path does not exist or is not accessible: {}",
                path.display()
            );
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn find_image_files(
    dir: &Path,
    recursive: bool,
    pattern: Option<&str>,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(dir).max_depth(max_depth) {
        let entry = entry?;
        if entry.file_type().is_file() {
            let path = entry.path();
            if is_image_file(path, extensions) && matches_pattern(path, pattern) {
                files.push(path.to_path_buf());
            }
        }
    }

    Ok(files)
}

/// Check the extension against the accepted list (entries carry the dot)
fn is_image_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .is_some_and(|ext| extensions.iter().any(|accepted| accepted.eq_ignore_ascii_case(&ext)))
}

fn matches_pattern(path: &Path, pattern: Option<&str>) -> bool {
    match pattern {
        Some(pat) => path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|filename| {
                glob::Pattern::new(pat)
                    .map(|p| p.matches(filename))
                    .unwrap_or(false)
            }),
        None => true,
    }
}

fn is_glob(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
