use std::path::{Path, PathBuf};

use crate::task::OutputFormat;

/// Pixel format every encoded output uses (YUV 4:2:0)
const PIXEL_FORMAT: &str = "yuv420p";

/// Scale to 512px wide keeping the aspect ratio
const GIF_SCALE: &str = "scale=512:-1:flags=lanczos";

/// Cover a 1080x1920 frame, then crop the overflow from the center
const VERTICAL_CROP: &str = "scale=1080:1920:force_original_aspect_ratio=increase,crop=1080:1920";

pub const MIN_SPEED_FACTOR: f64 = 0.5;
pub const MAX_SPEED_FACTOR: f64 = 2.0;

/// Abstract media processing command representation
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
    /// File the command produces, if any
    pub output_path: Option<PathBuf>,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
            output_path: None,
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    fn path_arg<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").path_arg(path)
    }

    /// Add output file; it becomes the command's artifact
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self.path_arg(path)
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy every stream without re-encoding
    pub fn copy_streams(self) -> Self {
        self.arg("-c").arg("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Highest variable bitrate audio quality
    pub fn best_audio_quality(self) -> Self {
        self.arg("-q:a").arg("0")
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Add audio filter
    pub fn audio_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-af").arg(filter)
    }

    /// Add a filter graph
    pub fn filter_complex<S: Into<String>>(self, graph: S) -> Self {
        self.arg("-filter_complex").arg(graph)
    }

    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.arg("-map").arg(stream)
    }

    pub fn pixel_format(self) -> Self {
        self.arg("-pix_fmt").arg(PIXEL_FORMAT)
    }

    /// Limit output duration in seconds
    pub fn duration(self, seconds: f64) -> Self {
        self.arg("-t").arg(seconds.to_string())
    }

    /// Read a concat demuxer playlist as input
    pub fn concat_input<P: AsRef<Path>>(self, playlist: P) -> Self {
        self.args(["-f", "concat", "-safe", "0"]).input(playlist)
    }

    /// Encode as gif at 512px wide
    fn gif_encoding(self) -> Self {
        self.video_filter(GIF_SCALE).video_codec("gif")
    }

    /// Command line as the shell would see it
    pub fn display(&self) -> String {
        std::iter::once(self.binary_path.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builder for the per-task ffmpeg templates
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_path: String,
    overwrite: bool,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_path: probe_path.into(),
            overwrite: true,
        }
    }

    /// Pass `-y` to every encoding command (on by default)
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn ffmpeg<S: Into<String>>(&self, description: S) -> MediaCommand {
        let cmd = MediaCommand::new(&self.binary_path, description);
        if self.overwrite { cmd.overwrite() } else { cmd }
    }

    /// Re-encode as H.264/AAC, optionally forcing a frame rate
    pub fn convert_to_mp4(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        fps: Option<u32>,
    ) -> MediaCommand {
        let mut cmd = self
            .ffmpeg("Convert to mp4")
            .input(input)
            .pixel_format()
            .video_codec("libx264")
            .audio_codec("aac")
            .best_audio_quality();

        if let Some(fps) = fps {
            cmd = cmd.arg("-r").arg(fps.to_string());
        }

        cmd.output(output)
    }

    pub fn convert_to_gif(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        fps: u32,
    ) -> MediaCommand {
        self.ffmpeg("Convert to gif")
            .input(input)
            .pixel_format()
            .video_filter(format!("fps={},{}", fps, GIF_SCALE))
            .video_codec("gif")
            .output(output)
    }

    /// Audio stream only, at the highest quality
    pub fn extract_audio(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> MediaCommand {
        self.ffmpeg("Audio extraction")
            .input(input)
            .best_audio_quality()
            .map("a")
            .output(output)
    }

    /// Write numbered frames matching `output_pattern` (e.g. `out%03d.png`)
    pub fn extract_frames(
        &self,
        input: impl AsRef<Path>,
        output_pattern: impl AsRef<Path>,
        fps: Option<u32>,
    ) -> MediaCommand {
        let mut cmd = self.ffmpeg("Extract frames").input(input);
        if let Some(fps) = fps {
            cmd = cmd.video_filter(format!("fps={}", fps));
        }
        cmd.output(output_pattern)
    }

    /// Assemble every `*.{extension}` file in `frames_dir` into a video
    pub fn frames_to_video(
        &self,
        frames_dir: impl AsRef<Path>,
        extension: &str,
        output: impl AsRef<Path>,
        framerate: u32,
        format: OutputFormat,
    ) -> MediaCommand {
        let pattern = frames_dir.as_ref().join(format!("*.{}", extension));
        let cmd = self
            .ffmpeg(format!("Frames to {}", format.extension()))
            .arg("-framerate")
            .arg(framerate.to_string())
            .arg("-pattern_type")
            .arg("glob")
            .input(pattern)
            .pixel_format();

        let cmd = match format {
            OutputFormat::Gif => cmd.gif_encoding(),
            OutputFormat::Mp4 => cmd.video_codec("libx264"),
        };
        cmd.output(output)
    }

    /// Reverse video and audio
    pub fn reverse(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> MediaCommand {
        self.ffmpeg("Reverse video")
            .input(input)
            .video_filter("reverse")
            .audio_filter("areverse")
            .output(output)
    }

    /// Join the clips listed in `playlist`; gifs are re-encoded, everything else copied
    pub fn concat(
        &self,
        playlist: impl AsRef<Path>,
        output: impl AsRef<Path>,
        gif: bool,
    ) -> MediaCommand {
        let cmd = self.ffmpeg("Concatenate clips").concat_input(playlist);
        let cmd = if gif { cmd.gif_encoding() } else { cmd.copy_streams() };
        cmd.output(output)
    }

    pub fn make_vertical(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> MediaCommand {
        self.ffmpeg("Make vertical")
            .input(input)
            .video_filter(VERTICAL_CROP)
            .copy_audio()
            .output(output)
    }

    /// Mix `audio` under the original track, stopping at the shorter input
    pub fn add_background_music(
        &self,
        input: impl AsRef<Path>,
        audio: impl AsRef<Path>,
        output: impl AsRef<Path>,
        volume_ratio: f64,
    ) -> MediaCommand {
        self.ffmpeg("Add background music")
            .input(input)
            .input(audio)
            .filter_complex(format!(
                "[0:a][1:a]amix=inputs=2:weights=1 {}[a]",
                volume_ratio
            ))
            .map("0:v")
            .map("[a]")
            .video_codec("copy")
            .audio_codec("aac")
            .arg("-shortest")
            .output(output)
    }

    /// Still image to vertical video with a slow centered zoom
    pub fn image_to_video(
        &self,
        image: impl AsRef<Path>,
        output: impl AsRef<Path>,
        fps: u32,
        duration: u32,
    ) -> MediaCommand {
        let frames = u64::from(fps) * u64::from(duration);
        self.ffmpeg("Image to video")
            .input(image)
            .arg("-loop")
            .arg("1")
            .duration(f64::from(duration))
            .arg("-framerate")
            .arg(fps.to_string())
            .video_filter(format!(
                "{},zoompan=z='min(zoom+0.0015,1.5)':d={}:x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':s=1080x1920",
                VERTICAL_CROP, frames
            ))
            .video_codec("libx264")
            .pixel_format()
            .output(output)
    }

    pub fn slideshow(&self, playlist: impl AsRef<Path>, output: impl AsRef<Path>) -> MediaCommand {
        self.ffmpeg("Slideshow")
            .concat_input(playlist)
            .video_filter(VERTICAL_CROP)
            .video_codec("libx264")
            .pixel_format()
            .output(output)
    }

    /// Cut to `seconds` without re-encoding
    pub fn trim(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        seconds: f64,
    ) -> MediaCommand {
        self.ffmpeg(format!("Trim to {}s", seconds))
            .input(input)
            .duration(seconds)
            .copy_streams()
            .output(output)
    }

    /// Play the video `factor` times faster, audio tempo included
    pub fn speed_to_fit(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        factor: f64,
    ) -> MediaCommand {
        self.ffmpeg(format!("Speed x{}", factor))
            .input(input)
            .filter_complex(format!(
                "[0:v]setpts={}*PTS[v]; [0:a]atempo={}[a]",
                1.0 / factor,
                factor
            ))
            .map("[v]")
            .map("[a]")
            .video_codec("libx264")
            .audio_codec("aac")
            .output(output)
    }

    /// Container duration, printed bare on stdout
    pub fn probe_duration(&self, path: impl AsRef<Path>) -> MediaCommand {
        MediaCommand::new(&self.probe_path, "Duration probe")
            .args(["-v", "quiet"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .path_arg(path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

/// Speed factor that stretches `video_duration` onto `audio_duration`.
///
/// Clipped to [0.5, 2.0]; a NaN ratio (both durations zero) yields 1.0.
pub fn speed_factor(video_duration: f64, audio_duration: f64) -> f64 {
    let raw = video_duration / audio_duration;
    if raw.is_nan() {
        1.0
    } else {
        raw.clamp(MIN_SPEED_FACTOR, MAX_SPEED_FACTOR)
    }
}
