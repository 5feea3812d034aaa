//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::config::{StudioConfig, StudioConfigBuilder};
use anyhow::{Context, Result};
use std::path::Path;

/// Layers CLI flags over the configuration file
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `StudioConfig` from CLI arguments.
    ///
    /// An explicit `--config` must exist; the per-user file is used only
    /// when present.
    pub(crate) fn from_cli(cli: &Cli) -> Result<StudioConfig> {
        let base = match &cli.config {
            Some(path) => StudioConfig::from_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => Self::load_default_file()?,
        };

        let mut builder = StudioConfigBuilder::from_config(base);
        if let Some(program) = &cli.remover {
            builder = builder.remover_program(program.clone());
        }
        if !cli.remover_arg.is_empty() {
            builder = builder.remover_args(cli.remover_arg.iter().cloned());
        }
        if cli.no_diagnostics {
            builder = builder.diagnostics(false);
        }
        if cli.no_eager_release {
            builder = builder.eager_release(false);
        }

        builder.build().context("Invalid configuration")
    }

    fn load_default_file() -> Result<StudioConfig> {
        match StudioConfig::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("Using config file {}", path.display());
                StudioConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config file {}", path.display()))
            },
            _ => Ok(StudioConfig::default()),
        }
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if let Some(pattern) = &cli.pattern {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid --pattern '{}'", pattern))?;
        }

        let output = Path::new(&cli.output);
        if output.is_file() {
            anyhow::bail!(
                "Output path exists and is a file, not a directory: {}",
                output.display()
            );
        }

        if let Some(program) = &cli.remover {
            if program.trim().is_empty() {
                anyhow::bail!("--remover must not be empty");
            }
        }

        Ok(())
    }
}
