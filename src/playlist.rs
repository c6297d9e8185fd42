//! Playlists for ffmpeg's concat demuxer

use std::path::{Path, PathBuf};

/// Quote a path for a `file` directive, escaping embedded single quotes
fn quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// Original clip followed by its reversed copy
pub fn bounce_playlist(original: &Path, reversed: &Path) -> String {
    format!("file {}\nfile {}\n", quote(original), quote(reversed))
}

/// Slideshow playlist spreading `total_duration` evenly across `images`.
///
/// The last image is listed once more without a duration so the concat
/// demuxer shows the final slide for its full time. Returns the per-image
/// duration along with the playlist text.
pub fn slideshow_playlist(images: &[PathBuf], total_duration: u32) -> (f64, String) {
    let per_image = f64::from(total_duration) / images.len().max(1) as f64;

    let mut playlist = String::new();
    for image in images {
        playlist.push_str(&format!("file {}\nduration {}\n", quote(image), per_image));
    }
    if let Some(last) = images.last() {
        playlist.push_str(&format!("file {}\n", quote(last)));
    }

    (per_image, playlist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slideshow_even_split_repeats_last_image() {
        let images: Vec<PathBuf> = ["a.png", "b.png", "c.jpg", "d.jpeg"]
            .iter()
            .map(|name| PathBuf::from("/work/zip").join(name))
            .collect();

        let (per_image, playlist) = slideshow_playlist(&images, 20);
        assert_eq!(per_image, 5.0);

        let lines: Vec<&str> = playlist.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "file '/work/zip/a.png'");
        assert_eq!(lines[1], "duration 5");
        assert_eq!(lines[7], "duration 5");
        assert_eq!(lines[8], "file '/work/zip/d.jpeg'");
        assert_eq!(lines.iter().filter(|l| l.starts_with("duration")).count(), 4);
    }

    #[test]
    fn test_fractional_durations() {
        let images = vec![PathBuf::from("1.png"), PathBuf::from("2.png"), PathBuf::from("3.png")];
        let (per_image, playlist) = slideshow_playlist(&images, 10);
        assert!((per_image - 3.333_333).abs() < 1e-5);
        assert!(playlist.contains("duration 3.333"));
    }

    #[test]
    fn test_bounce_playlist_escapes_quotes() {
        let playlist = bounce_playlist(Path::new("/in/it's.mp4"), Path::new("/out/reversed.mp4"));
        assert_eq!(
            playlist,
            "file '/in/it'\\''s.mp4'\nfile '/out/reversed.mp4'\n"
        );
    }
}
