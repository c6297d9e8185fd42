use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FrameKitError, Result};
use crate::task::TaskParams;

fn default_probe_path() -> String {
    "ffprobe".to_string()
}

fn default_overwrite() -> bool {
    true
}

fn default_isolated() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// Parameter defaults used when a request leaves them out
    #[serde(default)]
    pub defaults: TaskParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
    /// Pass -y so ffmpeg never stops to ask about existing files
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding the workspaces
    pub root: PathBuf,
    /// Give every invocation its own directory under `root`.
    /// When false, `root` itself is emptied and reused on each call,
    /// so invocations must not overlap.
    #[serde(default = "default_isolated")]
    pub isolated: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: default_probe_path(),
            overwrite: default_overwrite(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: std::env::temp_dir().join("framekit"),
            isolated: default_isolated(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FrameKitError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)?;

        config.defaults.validate().map_err(|e| {
            FrameKitError::Config(format!("Invalid parameter defaults: {}", e))
        })?;

        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FrameKitError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| FrameKitError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("framekit.toml");
        std::fs::write(
            &path,
            "[media]\nbinary_path = \"/opt/ffmpeg/bin/ffmpeg\"\n\n[defaults]\nduration = 12\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.media.binary_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.media.probe_path, "ffprobe");
        assert!(config.media.overwrite);
        assert!(config.workspace.isolated);
        assert_eq!(config.defaults.duration, 12);
        assert_eq!(config.defaults.fps, 0);
        assert_eq!(config.defaults.volume_ratio, 0.3);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("framekit.toml");

        let mut config = Config::default();
        config.workspace.root = dir.path().join("outputs");
        config.workspace.isolated = false;
        config.save_to_file(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.workspace.root, dir.path().join("outputs"));
        assert!(!reloaded.workspace.isolated);
    }

    #[test]
    fn test_rejects_zero_default_duration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("framekit.toml");
        std::fs::write(&path, "[defaults]\nduration = 0\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(FrameKitError::Config(_))));
    }

    #[test]
    fn test_malformed_file_reports_toml_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("framekit.toml");
        std::fs::write(&path, "[media\nbinary_path = ").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, FrameKitError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parsing error"));
    }
}
