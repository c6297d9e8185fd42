// Media processing layer
//
// - Commands: command representation and the per-task ffmpeg templates
// - Processor: runs commands as child processes
// - Probe: reads media durations through ffprobe

pub mod commands;
pub mod probe;
pub mod processor;

use async_trait::async_trait;

pub use commands::*;
pub use probe::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Runs external media tools
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRunner: Send + Sync {
    /// Run the command to completion and return its standard output
    async fn execute(&self, command: &MediaCommand) -> Result<String>;

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn version_info(&self) -> Result<String>;
}

/// Factory for creating media runner instances
pub struct MediaRunnerFactory;

impl MediaRunnerFactory {
    /// Create the default runner (child processes)
    pub fn create_runner(config: MediaConfig) -> Box<dyn MediaRunner> {
        Box::new(processor::ProcessRunner::new(config))
    }
}
