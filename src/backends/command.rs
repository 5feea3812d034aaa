//! Removal capability backed by an external executable
//!
//! The program is invoked once per image inside a scratch directory:
//!
//! ```text
//! <program> <input> --output <output.png> --format png [--verbose] [--no-cache] [extra args...]
//! ```
//!
//! which is the calling convention of the `imgly-bgremove` CLI.

use crate::{
    config::{RemovalOptions, RemoverCommand},
    error::{Result, StudioError},
    intake::ImageFile,
    remover::BackgroundRemover,
};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

const OUTPUT_FILE_NAME: &str = "output.png";

/// Runs an external background-removal program
#[derive(Debug, Clone)]
pub struct CommandRemover {
    program: String,
    args: Vec<String>,
}

impl CommandRemover {
    /// Create a remover for `program` with no extra arguments
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Create a remover from configuration
    #[must_use]
    pub fn from_config(command: &RemoverCommand) -> Self {
        Self {
            program: command.program.clone(),
            args: command.args.clone(),
        }
    }

    /// Append extra arguments after the standard ones
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program that will be executed
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for one invocation
    #[must_use]
    pub fn command_args(&self, input: &Path, output: &Path, options: &RemovalOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            input.as_os_str().to_owned(),
            "--output".into(),
            output.as_os_str().to_owned(),
            "--format".into(),
            "png".into(),
        ];
        if options.diagnostics {
            args.push("--verbose".into());
        }
        if options.eager_release {
            args.push("--no-cache".into());
        }
        args.extend(self.args.iter().map(OsString::from));
        args
    }

    fn failure_message(&self, status: std::process::ExitStatus, stderr: &str) -> String {
        stderr
            .lines()
            .map(str::trim)
            .rev()
            .find(|line| !line.is_empty())
            .map_or_else(
                || format!("'{}' exited with {}", self.program, status),
                ToString::to_string,
            )
    }
}

#[async_trait]
impl BackgroundRemover for CommandRemover {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(skip(self, file, options), fields(program = %self.program, file = %file.name))]
    async fn remove(&self, file: &ImageFile, options: &RemovalOptions) -> Result<Vec<u8>> {
        let workdir = tempfile::Builder::new()
            .prefix("bgremove-studio-")
            .tempdir()?;
        let input = workdir
            .path()
            .join(format!("input{}", file.extension().unwrap_or_default()));
        let output = workdir.path().join(OUTPUT_FILE_NAME);

        tokio::fs::write(&input, &file.data)
            .await
            .map_err(|e| StudioError::file_io_error("stage input", &input, &e))?;

        let result = Command::new(&self.program)
            .args(self.command_args(&input, &output, options))
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                StudioError::removal(format!("Failed to launch '{}': {}", self.program, e))
            })?;

        let stderr = String::from_utf8_lossy(&result.stderr);
        if options.diagnostics {
            for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
                debug!(target: "bgremove_studio::remover", "{}", line);
            }
        }

        if !result.status.success() {
            return Err(StudioError::removal(
                self.failure_message(result.status, &stderr),
            ));
        }

        tokio::fs::read(&output).await.map_err(|e| {
            StudioError::removal(format!("'{}' produced no output: {}", self.program, e))
        })
    }
}
