use std::path::Path;
use tracing::debug;

use crate::error::{FrameKitError, Result};
use super::{MediaCommandBuilder, MediaRunner};

/// Parse the bare `format=duration` value printed by the probe
pub fn parse_duration(path: &Path, output: &str) -> Result<f64> {
    let trimmed = output.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite())
        .ok_or_else(|| FrameKitError::ProbeParse {
            path: path.display().to_string(),
            output: trimmed.to_string(),
        })
}

/// Container-level duration of `path` in seconds
pub async fn probe_duration(
    runner: &dyn MediaRunner,
    builder: &MediaCommandBuilder,
    path: &Path,
) -> Result<f64> {
    let command = builder.probe_duration(path);
    let stdout = runner.execute(&command).await?;
    let seconds = parse_duration(path, &stdout)?;
    debug!("Duration of {}: {}s", path.display(), seconds);
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MockMediaRunner;

    #[test]
    fn test_parse_duration() {
        let path = Path::new("clip.mp4");
        assert_eq!(parse_duration(path, "12.345000\n").unwrap(), 12.345);
        assert_eq!(parse_duration(path, "  7\n").unwrap(), 7.0);
    }

    #[test]
    fn test_parse_duration_rejects_missing_metadata() {
        let path = Path::new("still.png");
        for output in ["N/A\n", "", "nan"] {
            match parse_duration(path, output) {
                Err(FrameKitError::ProbeParse { path, .. }) => assert_eq!(path, "still.png"),
                other => panic!("expected parse error for {:?}, got {:?}", output, other),
            }
        }
    }

    #[tokio::test]
    async fn test_probe_duration_runs_probe_binary() {
        let mut runner = MockMediaRunner::new();
        runner
            .expect_execute()
            .withf(|cmd| cmd.binary_path == "ffprobe" && cmd.args.last().map(String::as_str) == Some("song.mp3"))
            .times(1)
            .returning(|_| Ok("42.5\n".to_string()));

        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let seconds = probe_duration(&runner, &builder, Path::new("song.mp3")).await.unwrap();
        assert_eq!(seconds, 42.5);
    }
}
