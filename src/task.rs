use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{FrameKitError, Result};

/// Frame rate used for GIF output and frame sequences when none is given
pub const DEFAULT_SEQUENCE_FPS: u32 = 12;

/// Frame rate used when rendering a still image to video
pub const DEFAULT_STILL_FPS: u32 = 30;

/// Input category a task expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputCategory {
    Video,
    Image,
    Zip,
}

impl fmt::Display for InputCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputCategory::Video => "video",
            InputCategory::Image => "image",
            InputCategory::Zip => "zip",
        };
        f.write_str(name)
    }
}

/// Every task the toolkit knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    ConvertInputToMp4,
    ConvertInputToGif,
    ExtractVideoAudioAsMp3,
    ZippedFramesToMp4,
    ZippedFramesToGif,
    ExtractFramesFromInput,
    ReverseVideo,
    BounceVideo,
    MakeVertical,
    AddBackgroundMusic,
    ImageToVideo,
    Slideshow,
    TrimToLength,
    TrimToAudio,
    SpeedToFit,
}

impl Task {
    pub const ALL: [Task; 15] = [
        Task::ConvertInputToMp4,
        Task::ConvertInputToGif,
        Task::ExtractVideoAudioAsMp3,
        Task::ZippedFramesToMp4,
        Task::ZippedFramesToGif,
        Task::ExtractFramesFromInput,
        Task::ReverseVideo,
        Task::BounceVideo,
        Task::MakeVertical,
        Task::AddBackgroundMusic,
        Task::ImageToVideo,
        Task::Slideshow,
        Task::TrimToLength,
        Task::TrimToAudio,
        Task::SpeedToFit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Task::ConvertInputToMp4 => "convert_input_to_mp4",
            Task::ConvertInputToGif => "convert_input_to_gif",
            Task::ExtractVideoAudioAsMp3 => "extract_video_audio_as_mp3",
            Task::ZippedFramesToMp4 => "zipped_frames_to_mp4",
            Task::ZippedFramesToGif => "zipped_frames_to_gif",
            Task::ExtractFramesFromInput => "extract_frames_from_input",
            Task::ReverseVideo => "reverse_video",
            Task::BounceVideo => "bounce_video",
            Task::MakeVertical => "make_vertical",
            Task::AddBackgroundMusic => "add_background_music",
            Task::ImageToVideo => "image_to_video",
            Task::Slideshow => "slideshow",
            Task::TrimToLength => "trim_to_length",
            Task::TrimToAudio => "trim_to_audio",
            Task::SpeedToFit => "speed_to_fit",
        }
    }

    /// Input category used for extension validation.
    ///
    /// `Slideshow` sits in the image group but expects a zip of images.
    pub fn category(&self) -> InputCategory {
        match self {
            Task::ZippedFramesToMp4 | Task::ZippedFramesToGif => InputCategory::Zip,
            Task::ImageToVideo | Task::Slideshow => InputCategory::Image,
            _ => InputCategory::Video,
        }
    }

    pub fn requires_audio(&self) -> bool {
        matches!(
            self,
            Task::AddBackgroundMusic | Task::TrimToAudio | Task::SpeedToFit
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            Task::ConvertInputToMp4 => "Re-encode a video as H.264/AAC mp4",
            Task::ConvertInputToGif => "Convert a video to a 512px wide gif",
            Task::ExtractVideoAudioAsMp3 => "Extract the audio track as mp3",
            Task::ZippedFramesToMp4 => "Assemble a zip of frames into an mp4",
            Task::ZippedFramesToGif => "Assemble a zip of frames into a gif",
            Task::ExtractFramesFromInput => "Extract every frame as png into a zip",
            Task::ReverseVideo => "Play video and audio backwards",
            Task::BounceVideo => "Play forwards then backwards",
            Task::MakeVertical => "Crop to a vertical 1080x1920 frame",
            Task::AddBackgroundMusic => "Mix an audio file under the original audio",
            Task::ImageToVideo => "Turn a still image into a zooming vertical video",
            Task::Slideshow => "Turn a zip of images into a vertical slideshow",
            Task::TrimToLength => "Cut a video to the requested duration",
            Task::TrimToAudio => "Cut a video to the length of an audio file",
            Task::SpeedToFit => "Retime a video to the length of an audio file",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = FrameKitError;

    fn from_str(s: &str) -> Result<Self> {
        Task::ALL
            .iter()
            .copied()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| {
                let valid = Task::ALL.iter().map(Task::as_str).collect::<Vec<_>>();
                FrameKitError::InvalidInput(format!(
                    "Unknown task '{}'. Valid tasks: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

fn default_duration() -> u32 {
    30
}

fn default_volume_ratio() -> f64 {
    0.3
}

/// Numeric parameters of a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskParams {
    /// Frames per second, 0 keeps the tool or task default
    #[serde(default)]
    pub fps: u32,
    /// Duration in seconds for trim_to_length, image_to_video and slideshow
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Background music weight relative to the original audio
    #[serde(default = "default_volume_ratio")]
    pub volume_ratio: f64,
}

impl Default for TaskParams {
    fn default() -> Self {
        Self {
            fps: 0,
            duration: default_duration(),
            volume_ratio: default_volume_ratio(),
        }
    }
}

impl TaskParams {
    pub fn validate(&self) -> Result<()> {
        if self.duration == 0 {
            return Err(FrameKitError::InvalidInput(
                "Duration must be a positive number of seconds".to_string(),
            ));
        }
        if !self.volume_ratio.is_finite() || self.volume_ratio <= 0.0 {
            return Err(FrameKitError::InvalidInput(format!(
                "Volume ratio must be a positive number, got {}",
                self.volume_ratio
            )));
        }
        Ok(())
    }

    fn fps_override(&self) -> Option<u32> {
        (self.fps != 0).then_some(self.fps)
    }
}

/// What the hosting side hands over for one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub task: Task,
    pub input_file: PathBuf,
    #[serde(default)]
    pub audio_file: Option<PathBuf>,
    #[serde(default)]
    pub params: TaskParams,
}

impl TaskRequest {
    pub fn new<P: Into<PathBuf>>(task: Task, input_file: P) -> Self {
        Self {
            task,
            input_file: input_file.into(),
            audio_file: None,
            params: TaskParams::default(),
        }
    }

    pub fn with_audio<P: Into<PathBuf>>(mut self, audio_file: P) -> Self {
        self.audio_file = Some(audio_file.into());
        self
    }

    pub fn with_params(mut self, params: TaskParams) -> Self {
        self.params = params;
        self
    }
}

/// Output container for tasks that come in an mp4 and a gif flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mp4,
    Gif,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Gif => "gif",
        }
    }
}

/// A task resolved against its parameters.
///
/// Each variant holds only what its command template reads, with task
/// defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    ConvertToMp4 { input: PathBuf, fps: Option<u32> },
    ConvertToGif { input: PathBuf, fps: u32 },
    ExtractAudio { input: PathBuf },
    ExtractFrames { input: PathBuf, fps: Option<u32> },
    ZippedFrames { archive: PathBuf, format: OutputFormat, framerate: u32 },
    Reverse { input: PathBuf },
    Bounce { input: PathBuf },
    MakeVertical { input: PathBuf },
    AddBackgroundMusic { input: PathBuf, audio: PathBuf, volume_ratio: f64 },
    ImageToVideo { image: PathBuf, fps: u32, duration: u32 },
    Slideshow { archive: PathBuf, duration: u32 },
    TrimToLength { input: PathBuf, duration: u32 },
    TrimToAudio { input: PathBuf, audio: PathBuf },
    SpeedToFit { input: PathBuf, audio: PathBuf },
}

impl Job {
    pub fn plan(request: &TaskRequest) -> Result<Self> {
        let input = request.input_file.clone();
        let params = &request.params;

        let job = match request.task {
            Task::ConvertInputToMp4 => Job::ConvertToMp4 {
                input,
                fps: params.fps_override(),
            },
            Task::ConvertInputToGif => Job::ConvertToGif {
                input,
                fps: params.fps_override().unwrap_or(DEFAULT_SEQUENCE_FPS),
            },
            Task::ExtractVideoAudioAsMp3 => Job::ExtractAudio { input },
            Task::ZippedFramesToMp4 | Task::ZippedFramesToGif => Job::ZippedFrames {
                archive: input,
                format: if request.task == Task::ZippedFramesToGif {
                    OutputFormat::Gif
                } else {
                    OutputFormat::Mp4
                },
                framerate: params.fps_override().unwrap_or(DEFAULT_SEQUENCE_FPS),
            },
            Task::ExtractFramesFromInput => Job::ExtractFrames {
                input,
                fps: params.fps_override(),
            },
            Task::ReverseVideo => Job::Reverse { input },
            Task::BounceVideo => Job::Bounce { input },
            Task::MakeVertical => Job::MakeVertical { input },
            Task::AddBackgroundMusic => Job::AddBackgroundMusic {
                input,
                audio: required_audio(request)?,
                volume_ratio: params.volume_ratio,
            },
            Task::ImageToVideo => Job::ImageToVideo {
                image: input,
                fps: params.fps_override().unwrap_or(DEFAULT_STILL_FPS),
                duration: params.duration,
            },
            Task::Slideshow => Job::Slideshow {
                archive: input,
                duration: params.duration,
            },
            Task::TrimToLength => Job::TrimToLength {
                input,
                duration: params.duration,
            },
            Task::TrimToAudio => Job::TrimToAudio {
                input,
                audio: required_audio(request)?,
            },
            Task::SpeedToFit => Job::SpeedToFit {
                input,
                audio: required_audio(request)?,
            },
        };

        Ok(job)
    }

    pub fn input(&self) -> &Path {
        match self {
            Job::ConvertToMp4 { input, .. }
            | Job::ConvertToGif { input, .. }
            | Job::ExtractAudio { input }
            | Job::ExtractFrames { input, .. }
            | Job::Reverse { input }
            | Job::Bounce { input }
            | Job::MakeVertical { input }
            | Job::AddBackgroundMusic { input, .. }
            | Job::TrimToLength { input, .. }
            | Job::TrimToAudio { input, .. }
            | Job::SpeedToFit { input, .. } => input,
            Job::ZippedFrames { archive, .. } | Job::Slideshow { archive, .. } => archive,
            Job::ImageToVideo { image, .. } => image,
        }
    }
}

fn required_audio(request: &TaskRequest) -> Result<PathBuf> {
    request.audio_file.clone().ok_or_else(|| {
        FrameKitError::InvalidInput(format!(
            "Audio file is required for {} task",
            request.task
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names_round_trip_through_from_str() {
        for task in Task::ALL {
            assert_eq!(task.as_str().parse::<Task>().unwrap(), task);
        }
        assert!("make_horizontal".parse::<Task>().is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(Task::ZippedFramesToGif.category(), InputCategory::Zip);
        assert_eq!(Task::Slideshow.category(), InputCategory::Image);
        assert_eq!(Task::ImageToVideo.category(), InputCategory::Image);
        assert_eq!(Task::SpeedToFit.category(), InputCategory::Video);

        let video_tasks = Task::ALL
            .iter()
            .filter(|t| t.category() == InputCategory::Video)
            .count();
        assert_eq!(video_tasks, 11);
    }

    #[test]
    fn test_gif_fps_default_applied_at_plan_time() {
        let request = TaskRequest::new(Task::ConvertInputToGif, "in.mp4");
        assert_eq!(
            Job::plan(&request).unwrap(),
            Job::ConvertToGif { input: "in.mp4".into(), fps: 12 }
        );

        let request = request.with_params(TaskParams { fps: 5, ..TaskParams::default() });
        assert_eq!(
            Job::plan(&request).unwrap(),
            Job::ConvertToGif { input: "in.mp4".into(), fps: 5 }
        );
    }

    #[test]
    fn test_still_image_defaults_to_30_fps() {
        let request = TaskRequest::new(Task::ImageToVideo, "still.png");
        assert_eq!(
            Job::plan(&request).unwrap(),
            Job::ImageToVideo { image: "still.png".into(), fps: 30, duration: 30 }
        );
    }

    #[test]
    fn test_audio_tasks_require_audio() {
        for task in [Task::AddBackgroundMusic, Task::TrimToAudio, Task::SpeedToFit] {
            let request = TaskRequest::new(task, "in.mp4");
            match Job::plan(&request) {
                Err(FrameKitError::InvalidInput(msg)) => assert!(msg.contains(task.as_str())),
                other => panic!("expected invalid input, got {:?}", other),
            }
        }

        let request = TaskRequest::new(Task::TrimToAudio, "in.mp4").with_audio("song.mp3");
        assert!(Job::plan(&request).is_ok());
    }

    #[test]
    fn test_params_validation() {
        assert!(TaskParams::default().validate().is_ok());
        assert!(TaskParams { duration: 0, ..TaskParams::default() }.validate().is_err());
        assert!(TaskParams { volume_ratio: 0.0, ..TaskParams::default() }.validate().is_err());
        assert!(TaskParams { volume_ratio: f64::NAN, ..TaskParams::default() }.validate().is_err());
    }
}
