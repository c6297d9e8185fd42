use std::path::Path;

use crate::error::{FrameKitError, Result};
use crate::task::{InputCategory, Task};

pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".3g2", ".3gp", ".a64", ".avi", ".flv", ".gif", ".gifv", ".m2v", ".m4v", ".mkv", ".mov",
    ".mp4", ".mpeg", ".mpg", ".mv", ".mxf", ".nsv", ".ogg", ".ogv", ".rm", ".rmvb", ".roq",
    ".svi", ".vob", ".webm", ".wmv", ".yuv",
];

pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp"];

pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".m4a", ".aac", ".ogg", ".flac"];

/// Extensions, without the dot, that frame and slideshow archives may contain
pub const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Lowercased extension including the leading dot, or an empty string
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Check the input (and optional audio) extension against what the task expects.
///
/// Runs before anything touches the filesystem or spawns a process.
pub fn validate_inputs(task: Task, input_file: &Path, audio_file: Option<&Path>) -> Result<()> {
    let extension = extension_of(input_file);

    match task.category() {
        InputCategory::Zip => {
            if extension != ".zip" {
                return Err(FrameKitError::InvalidInput(
                    "Input file must be a zip file".to_string(),
                ));
            }
        }
        InputCategory::Video => {
            if !VIDEO_EXTENSIONS.contains(&extension.as_str()) {
                return Err(FrameKitError::InvalidInput(format!(
                    "Input file must be a video file with one of the following extensions: {}",
                    VIDEO_EXTENSIONS.join(", ")
                )));
            }
        }
        InputCategory::Image if task == Task::Slideshow => {
            if extension != ".zip" {
                return Err(FrameKitError::InvalidInput(
                    "For slideshow, input must be a zip file containing images".to_string(),
                ));
            }
        }
        InputCategory::Image => {
            if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
                return Err(FrameKitError::InvalidInput(format!(
                    "Input file must be an image file with one of the following extensions: {}",
                    IMAGE_EXTENSIONS.join(", ")
                )));
            }
        }
    }

    if let Some(audio_file) = audio_file {
        if !AUDIO_EXTENSIONS.contains(&extension_of(audio_file).as_str()) {
            return Err(FrameKitError::InvalidInput(format!(
                "Audio file must have one of the following extensions: {}",
                AUDIO_EXTENSIONS.join(", ")
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks_in(category: InputCategory) -> Vec<Task> {
        Task::ALL
            .iter()
            .copied()
            .filter(|t| t.category() == category)
            .collect()
    }

    #[test]
    fn test_zip_tasks_accept_any_case_of_zip() {
        for task in tasks_in(InputCategory::Zip) {
            for name in ["frames.zip", "frames.ZIP", "frames.Zip"] {
                assert!(validate_inputs(task, Path::new(name), None).is_ok(), "{}", name);
            }
            for name in ["frames.tar", "frames.png", "frames"] {
                assert!(validate_inputs(task, Path::new(name), None).is_err(), "{}", name);
            }
        }
    }

    #[test]
    fn test_video_tasks_follow_video_extension_set() {
        for task in tasks_in(InputCategory::Video) {
            for ext in VIDEO_EXTENSIONS {
                let path = format!("clip{}", ext.to_uppercase());
                assert!(validate_inputs(task, Path::new(&path), None).is_ok(), "{}", path);
            }
            for name in ["clip.zip", "clip.jpg", "clip.mp3"] {
                let err = validate_inputs(task, Path::new(name), None).unwrap_err();
                assert!(err.to_string().contains(".mp4"));
            }
        }
    }

    #[test]
    fn test_slideshow_wants_a_zip_not_an_image() {
        assert!(validate_inputs(Task::Slideshow, Path::new("photos.zip"), None).is_ok());
        assert!(validate_inputs(Task::Slideshow, Path::new("photo.jpg"), None).is_err());
    }

    #[test]
    fn test_image_tasks_reject_zip() {
        assert!(validate_inputs(Task::ImageToVideo, Path::new("photos.zip"), None).is_err());
        for ext in IMAGE_EXTENSIONS {
            let path = format!("photo{}", ext);
            assert!(validate_inputs(Task::ImageToVideo, Path::new(&path), None).is_ok());
        }
    }

    #[test]
    fn test_audio_extension_checked_for_every_task() {
        let bad_audio = Some(Path::new("song.txt"));
        assert!(validate_inputs(Task::ReverseVideo, Path::new("clip.mp4"), bad_audio).is_err());
        assert!(validate_inputs(Task::Slideshow, Path::new("photos.zip"), bad_audio).is_err());

        let good_audio = Some(Path::new("song.FLAC"));
        assert!(validate_inputs(Task::SpeedToFit, Path::new("clip.mp4"), good_audio).is_ok());
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("/tmp/A.MoV")), ".mov");
        assert_eq!(extension_of(Path::new("/tmp/noext")), "");
    }
}
