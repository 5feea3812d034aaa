//! Configuration types for background removal sessions

use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default size ceiling for an accepted image (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10_485_760;

/// Default external removal program
pub const DEFAULT_REMOVER_PROGRAM: &str = "imgly-bgremove";

/// Which files the intake accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakePolicy {
    /// MIME pattern, either `type/subtype` or `type/*`
    pub mime_pattern: String,
    /// Accepted extensions including the leading dot, compared case-insensitively
    pub extensions: Vec<String>,
    /// Maximum number of files in one drop
    pub max_files: usize,
    /// Maximum size of one file in bytes (inclusive)
    pub max_bytes: u64,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            mime_pattern: "image/*".to_string(),
            extensions: [".png", ".jpg", ".jpeg", ".webp"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_files: 1,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl IntakePolicy {
    /// Validate the policy
    pub fn validate(&self) -> Result<()> {
        if self.max_files == 0 {
            return Err(StudioError::config_value_error(
                "max_files",
                self.max_files,
                ">= 1",
            ));
        }
        if self.max_bytes == 0 {
            return Err(StudioError::config_value_error(
                "max_bytes",
                self.max_bytes,
                ">= 1",
            ));
        }
        if self.extensions.is_empty() {
            return Err(StudioError::invalid_config(
                "At least one accepted extension is required",
            ));
        }
        if let Some(bad) = self.extensions.iter().find(|ext| !is_valid_extension(ext)) {
            return Err(StudioError::invalid_config(format!(
                "Extension '{}' must start with '.' and have a name",
                bad
            )));
        }
        match self.mime_pattern.split_once('/') {
            Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty() && kind != "*" => {
                Ok(())
            },
            _ => Err(StudioError::invalid_config(format!(
                "MIME pattern '{}' must look like 'image/*' or 'image/png'",
                self.mime_pattern
            ))),
        }
    }
}

fn is_valid_extension(ext: &str) -> bool {
    ext.strip_prefix('.')
        .is_some_and(|name| !name.is_empty() && !name.contains('.'))
}

/// Options handed to the removal capability with every invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovalOptions {
    /// Ask the capability for diagnostic output
    pub diagnostics: bool,
    /// Ask the capability to release its model resources after each call
    pub eager_release: bool,
}

impl Default for RemovalOptions {
    fn default() -> Self {
        Self {
            diagnostics: true,
            eager_release: true,
        }
    }
}

/// External program used by the command remover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoverCommand {
    /// Program name or path
    pub program: String,
    /// Extra arguments appended after the standard ones
    pub args: Vec<String>,
}

impl Default for RemoverCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_REMOVER_PROGRAM.to_string(),
            args: Vec::new(),
        }
    }
}

/// Configuration for a removal session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Intake accept policy
    pub intake: IntakePolicy,
    /// Options passed to the removal capability
    pub removal: RemovalOptions,
    /// External program used by the command remover
    pub remover: RemoverCommand,
}

impl StudioConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bgremove_studio::StudioConfig;
    ///
    /// let config = StudioConfig::builder()
    ///     .max_bytes(5 * 1024 * 1024)
    ///     .diagnostics(false)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.intake.max_bytes, 5 * 1024 * 1024);
    /// ```
    #[must_use]
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder::new()
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.intake.validate()?;
        if self.remover.program.trim().is_empty() {
            return Err(StudioError::invalid_config(
                "Remover program must not be empty",
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StudioError::file_io_error("read config file", path, &e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StudioError::file_io_error("create config directory", parent, &e))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| StudioError::file_io_error("write config file", path, &e))
    }

    /// Per-user config location, `<config_dir>/bgremove-studio/config.json`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bgremove-studio").join("config.json"))
    }
}

/// Builder for `StudioConfig`
pub struct StudioConfigBuilder {
    config: StudioConfig,
}

impl StudioConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: StudioConfig::default(),
        }
    }

    /// Start from an existing configuration
    #[must_use]
    pub fn from_config(config: StudioConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn mime_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.config.intake.mime_pattern = pattern.into();
        self
    }

    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.intake.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn max_files(mut self, max_files: usize) -> Self {
        self.config.intake.max_files = max_files;
        self
    }

    #[must_use]
    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.config.intake.max_bytes = max_bytes;
        self
    }

    #[must_use]
    pub fn diagnostics(mut self, diagnostics: bool) -> Self {
        self.config.removal.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn eager_release(mut self, eager_release: bool) -> Self {
        self.config.removal.eager_release = eager_release;
        self
    }

    #[must_use]
    pub fn remover_program<S: Into<String>>(mut self, program: S) -> Self {
        self.config.remover.program = program.into();
        self
    }

    #[must_use]
    pub fn remover_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.remover.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<StudioConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for StudioConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
