use async_trait::async_trait;
use std::process::{Command as StdCommand, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{FrameKitError, Result};
use super::{MediaCommand, MediaCommandBuilder, MediaRunner};

/// Runs media commands as child processes, one at a time
pub struct ProcessRunner {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl ProcessRunner {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, &config.probe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaRunner for ProcessRunner {
    async fn execute(&self, command: &MediaCommand) -> Result<String> {
        info!("Running {} command: {}", command.description, command.display());

        let output = Command::new(&command.binary_path)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                FrameKitError::Media(format!("Failed to execute {}: {}", command.binary_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FrameKitError::ToolFailed {
                command: command.display(),
                code: output.status.code(),
                output: stderr.trim().to_string(),
            });
        }

        debug!("{} finished", command.description);
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn check_availability(&self) -> Result<()> {
        for binary in [&self.config.binary_path, &self.config.probe_path] {
            let output = StdCommand::new(binary)
                .arg("-version")
                .stdin(Stdio::null())
                .output()
                .map_err(|e| FrameKitError::Media(format!("{} not found: {}", binary, e)))?;

            if !output.status.success() {
                return Err(FrameKitError::Media(format!("{} version check failed", binary)));
            }
        }

        info!("Media tools are available");
        Ok(())
    }

    async fn version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.execute(&self.command_builder.version_check()).await?;

        // The first line carries the version
        let first_line = stdout.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> ProcessRunner {
        ProcessRunner::new(MediaConfig::default())
    }

    #[tokio::test]
    async fn test_execute_returns_stdout() {
        let command = MediaCommand::new("sh", "Echo").args(["-c", "echo 3.5"]);
        let stdout = runner().execute(&command).await.unwrap();
        assert_eq!(stdout.trim(), "3.5");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_wrapped() {
        let command = MediaCommand::new("sh", "Failing step").args(["-c", "echo broken >&2; exit 3"]);
        match runner().execute(&command).await {
            Err(FrameKitError::ToolFailed { command, code, output }) => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(code, Some(3));
                assert_eq!(output, "broken");
            }
            other => panic!("expected tool failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let command = MediaCommand::new("framekit-no-such-binary", "Missing");
        assert!(matches!(
            runner().execute(&command).await,
            Err(FrameKitError::Media(_))
        ));
    }
}
