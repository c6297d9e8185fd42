use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{FrameKitError, Result};
use crate::media::{
    probe_duration, speed_factor, MediaCommand, MediaCommandBuilder, MediaRunner,
    MediaRunnerFactory,
};
use crate::playlist::{bounce_playlist, slideshow_playlist};
use crate::task::{Job, TaskRequest};
use crate::validate::{extension_of, validate_inputs};
use crate::workspace::Workspace;

/// Result of one invocation
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    /// Workspace the artifacts were written to
    pub workspace: PathBuf,
    /// Produced files, in production order
    pub artifacts: Vec<PathBuf>,
}

pub struct Workflow {
    config: Config,
    media: Box<dyn MediaRunner>,
    commands: MediaCommandBuilder,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaRunnerFactory::create_runner(config.media.clone());

        // Check dependencies
        media.check_availability()?;

        Ok(Self::with_runner(config, media))
    }

    /// Build a workflow around an existing runner without probing for the tools
    pub fn with_runner(config: Config, media: Box<dyn MediaRunner>) -> Self {
        let commands = MediaCommandBuilder::new(&config.media.binary_path, &config.media.probe_path)
            .with_overwrite(config.media.overwrite);

        Self {
            config,
            media,
            commands,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// First line of the media tool's version banner
    pub async fn version_info(&self) -> Result<String> {
        self.media.version_info().await
    }

    /// Run one task and collect what it produced
    pub async fn predict(&self, request: &TaskRequest) -> Result<TaskOutput> {
        info!("Running task {} on {}", request.task, request.input_file.display());

        ensure_exists(&request.input_file)?;
        if let Some(audio_file) = &request.audio_file {
            ensure_exists(audio_file)?;
        }

        request.params.validate()?;
        validate_inputs(request.task, &request.input_file, request.audio_file.as_deref())?;

        // Playlists are resolved relative to their own location, so hand
        // every step absolute paths
        let mut request = request.clone();
        request.input_file = std::path::absolute(&request.input_file)?;
        if let Some(audio_file) = request.audio_file.take() {
            request.audio_file = Some(std::path::absolute(audio_file)?);
        }

        self.ensure_outside_workspace(&request)?;

        let job = Job::plan(&request)?;
        debug!("Planned {:?} for {}", job, job.input().display());
        let workspace = Workspace::from_config(&self.config.workspace)?;
        let artifacts = self.execute(&job, &workspace).await?;

        info!("Task {} produced {} file(s)", request.task, artifacts.len());
        Ok(TaskOutput {
            workspace: workspace.path().to_path_buf(),
            artifacts,
        })
    }

    /// A shared workspace is deleted before the run, so inputs may not live in it
    fn ensure_outside_workspace(&self, request: &TaskRequest) -> Result<()> {
        if self.config.workspace.isolated {
            return Ok(());
        }

        let root = std::path::absolute(&self.config.workspace.root)?;
        let inputs = std::iter::once(&request.input_file).chain(request.audio_file.as_ref());
        for path in inputs {
            if path.starts_with(&root) {
                return Err(FrameKitError::InvalidInput(format!(
                    "{} is inside the shared workspace {}, which is cleared before each run",
                    path.display(),
                    root.display()
                )));
            }
        }
        Ok(())
    }

    async fn execute(&self, job: &Job, workspace: &Workspace) -> Result<Vec<PathBuf>> {
        let commands = &self.commands;

        match job {
            Job::ConvertToMp4 { input, fps } => {
                self.run(commands.convert_to_mp4(input, workspace.join("video.mp4"), *fps))
                    .await
            }
            Job::ConvertToGif { input, fps } => {
                self.run(commands.convert_to_gif(input, workspace.join("video.gif"), *fps))
                    .await
            }
            Job::ExtractAudio { input } => {
                self.run(commands.extract_audio(input, workspace.join("audio.mp3")))
                    .await
            }
            Job::ExtractFrames { input, fps } => {
                self.run(commands.extract_frames(input, workspace.join("out%03d.png"), *fps))
                    .await?;
                let archive = workspace.pack_frames("out", "png", "frames.zip")?;
                Ok(vec![archive])
            }
            Job::ZippedFrames { archive, format, framerate } => {
                workspace.unzip(archive)?;
                let extension = workspace.first_frame_extension()?.ok_or_else(|| {
                    FrameKitError::InvalidInput("No image files found in the zip file.".to_string())
                })?;

                let output = workspace.join(format!("video.{}", format.extension()));
                self.run(commands.frames_to_video(
                    workspace.archive_dir(),
                    &extension,
                    output,
                    *framerate,
                    *format,
                ))
                .await
            }
            Job::Reverse { input } => {
                let output = workspace.join(format!("reversed{}", suffix(input)));
                self.run(commands.reverse(input, output)).await
            }
            Job::Bounce { input } => {
                let reversed = workspace.join(format!("reversed{}", suffix(input)));
                self.run(commands.reverse(input, &reversed)).await?;

                let playlist = workspace
                    .write_playlist("concat_list.txt", &bounce_playlist(input, &reversed))?;
                let gif = extension_of(input) == ".gif";
                let output = workspace.join(format!("bounced{}", suffix(input)));
                self.run(commands.concat(playlist, output, gif)).await
            }
            Job::MakeVertical { input } => {
                self.run(commands.make_vertical(input, workspace.join("vertical.mp4")))
                    .await
            }
            Job::AddBackgroundMusic { input, audio, volume_ratio } => {
                let output = workspace.join("with_music.mp4");
                self.run(commands.add_background_music(input, audio, output, *volume_ratio))
                    .await
            }
            Job::ImageToVideo { image, fps, duration } => {
                let output = workspace.join("image_video.mp4");
                self.run(commands.image_to_video(image, output, *fps, *duration))
                    .await
            }
            Job::Slideshow { archive, duration } => {
                workspace.unzip(archive)?;
                let images = workspace.sorted_images()?;
                if images.is_empty() {
                    return Err(FrameKitError::InvalidInput(
                        "No image files found in zip".to_string(),
                    ));
                }

                let (per_image, contents) = slideshow_playlist(&images, *duration);
                info!("Showing {} images for {}s each", images.len(), per_image);
                let playlist = workspace.write_playlist("slideshow_list.txt", &contents)?;
                self.run(commands.slideshow(playlist, workspace.join("slideshow.mp4")))
                    .await
            }
            Job::TrimToLength { input, duration } => {
                let output = workspace.join("trimmed.mp4");
                self.run(commands.trim(input, output, f64::from(*duration)))
                    .await
            }
            Job::TrimToAudio { input, audio } => {
                let audio_duration = probe_duration(self.media.as_ref(), commands, audio).await?;
                let output = workspace.join("trimmed_to_audio.mp4");
                self.run(commands.trim(input, output, audio_duration)).await
            }
            Job::SpeedToFit { input, audio } => {
                let video_duration = probe_duration(self.media.as_ref(), commands, input).await?;
                let audio_duration = probe_duration(self.media.as_ref(), commands, audio).await?;
                let factor = speed_factor(video_duration, audio_duration);
                info!(
                    "Video {}s, audio {}s, speed factor {}",
                    video_duration, audio_duration, factor
                );

                let output = workspace.join("speed_fitted.mp4");
                self.run(commands.speed_to_fit(input, output, factor)).await
            }
        }
    }

    /// Run one step; its output file is the step's only artifact
    async fn run(&self, command: MediaCommand) -> Result<Vec<PathBuf>> {
        self.media.execute(&command).await?;
        Ok(command.output_path.into_iter().collect())
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(FrameKitError::FileNotFound(path.display().to_string()))
    }
}

/// Extension with its dot, case preserved
fn suffix(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
