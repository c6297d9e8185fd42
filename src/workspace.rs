use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::config::WorkspaceConfig;
use crate::error::Result;
use crate::validate::FRAME_EXTENSIONS;

/// Subdirectory that archive inputs are extracted into
const ARCHIVE_DIR: &str = "zip";

/// Directory owned by a single invocation.
///
/// Intermediate files and artifacts of one task live here. Nothing else
/// writes to it while the invocation runs.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Empty `path` (deleting whatever was there) and take it over
    pub fn reset<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let root = path.into();
        if root.exists() {
            debug!("Removing previous workspace contents at {}", root.display());
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;

        info!("Workspace ready: {}", root.display());
        Ok(Self { root })
    }

    /// Fresh uniquely named workspace under `base`
    pub fn isolated<P: AsRef<Path>>(base: P) -> Result<Self> {
        Self::reset(base.as_ref().join(Uuid::new_v4().to_string()))
    }

    pub fn from_config(config: &WorkspaceConfig) -> Result<Self> {
        if config.isolated {
            Self::isolated(&config.root)
        } else {
            Self::reset(&config.root)
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.root.join(name)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(ARCHIVE_DIR)
    }

    /// Extract `archive` into the archive directory and lowercase every
    /// top-level name. Returns the sorted listing after renaming.
    ///
    /// Names that only differ by case collapse into one; the entry renamed
    /// last wins.
    pub fn unzip(&self, archive: &Path) -> Result<Vec<String>> {
        info!("Unzipping {}", archive.display());
        let target = self.archive_dir();
        fs::create_dir_all(&target)?;

        let mut zip = ZipArchive::new(File::open(archive)?)?;
        zip.extract(&target)?;

        let names = list_names(&target)?;
        let mut claimed: HashSet<String> = names
            .iter()
            .filter(|name| name.to_lowercase() == **name)
            .cloned()
            .collect();
        for name in &names {
            let lowered = name.to_lowercase();
            if lowered == *name {
                continue;
            }
            if !claimed.insert(lowered.clone()) {
                warn!("{} collides with another entry as {}; keeping {}", name, lowered, name);
            }
            fs::rename(target.join(name), target.join(&lowered))?;
        }

        let names = list_names(&target)?;
        info!("Files in zip:");
        for name in &names {
            info!("{}", name);
        }
        Ok(names)
    }

    /// Extension of the first extracted frame image (sorted by name)
    pub fn first_frame_extension(&self) -> Result<Option<String>> {
        let names = list_names(&self.archive_dir())?;
        Ok(names
            .iter()
            .filter_map(|name| name.rsplit_once('.').map(|(_, ext)| ext))
            .find(|ext| FRAME_EXTENSIONS.contains(ext))
            .map(str::to_string))
    }

    /// Extracted frame images, sorted by name
    pub fn sorted_images(&self) -> Result<Vec<PathBuf>> {
        let dir = self.archive_dir();
        Ok(list_names(&dir)?
            .into_iter()
            .filter(|name| {
                name.rsplit_once('.')
                    .is_some_and(|(_, ext)| FRAME_EXTENSIONS.contains(&ext))
            })
            .map(|name| dir.join(name))
            .collect())
    }

    /// Zip every `{prefix}*.{extension}` file of the workspace into `archive_name`
    pub fn pack_frames(&self, prefix: &str, extension: &str, archive_name: &str) -> Result<PathBuf> {
        let suffix = format!(".{}", extension);
        let frames: Vec<String> = list_names(&self.root)?
            .into_iter()
            .filter(|name| name.starts_with(prefix) && name.ends_with(&suffix))
            .collect();

        let archive_path = self.join(archive_name);
        let mut writer = ZipWriter::new(File::create(&archive_path)?);
        let options = SimpleFileOptions::default();
        for name in &frames {
            writer.start_file(name.as_str(), options)?;
            let mut frame = File::open(self.join(name))?;
            io::copy(&mut frame, &mut writer)?;
        }
        writer.finish()?;

        info!("Packed {} frames into {}", frames.len(), archive_path.display());
        Ok(archive_path)
    }

    pub fn write_playlist(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.join(name);
        fs::write(&path, contents)?;
        debug!("Wrote playlist {}:\n{}", path.display(), contents);
        Ok(path)
    }
}

/// File and directory names directly inside `dir`, sorted
fn list_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
pub(crate) fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        io::Write::write_all(&mut writer, data.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[test]
    fn test_reset_clears_previous_contents() {
        let temp = TempDir::new().unwrap();
        let dir = temp.child("outputs");
        dir.child("stale.mp4").write_str("old").unwrap();

        let workspace = Workspace::reset(dir.path()).unwrap();
        assert!(workspace.path().is_dir());
        assert_eq!(list_names(workspace.path()).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_isolated_workspaces_are_distinct() {
        let temp = TempDir::new().unwrap();
        let a = Workspace::isolated(temp.path()).unwrap();
        let b = Workspace::isolated(temp.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(a.path().parent(), Some(temp.path()));
    }

    #[test]
    fn test_unzip_lowercases_names() {
        let temp = TempDir::new().unwrap();
        let archive = temp.child("frames.zip");
        write_zip(archive.path(), &[("Frame_002.PNG", "2"), ("frame_001.png", "1")]);

        let workspace = Workspace::reset(temp.child("work").path()).unwrap();
        let names = workspace.unzip(archive.path()).unwrap();
        assert_eq!(names, vec!["frame_001.png", "frame_002.png"]);
        temp.child("work/zip/frame_002.png").assert("2");
        assert_eq!(workspace.first_frame_extension().unwrap().as_deref(), Some("png"));
    }

    #[test]
    fn test_unzip_case_collision_keeps_last_renamed() {
        let temp = TempDir::new().unwrap();
        let archive = temp.child("frames.zip");
        write_zip(archive.path(), &[("A.png", "upper"), ("a.png", "lower")]);

        let workspace = Workspace::reset(temp.child("work").path()).unwrap();
        let names = workspace.unzip(archive.path()).unwrap();
        assert_eq!(names, vec!["a.png"]);
        temp.child("work/zip/a.png").assert("upper");
        assert_eq!(workspace.sorted_images().unwrap().len(), 1);
    }

    #[test]
    fn test_frame_lookup_ignores_other_formats() {
        let temp = TempDir::new().unwrap();
        let archive = temp.child("frames.zip");
        write_zip(archive.path(), &[("a.bmp", "a"), ("notes.txt", "n")]);

        let workspace = Workspace::reset(temp.child("work").path()).unwrap();
        workspace.unzip(archive.path()).unwrap();
        assert_eq!(workspace.first_frame_extension().unwrap(), None);
        assert!(workspace.sorted_images().unwrap().is_empty());
    }

    #[test]
    fn test_sorted_images() {
        let temp = TempDir::new().unwrap();
        let archive = temp.child("photos.zip");
        write_zip(
            archive.path(),
            &[("b.JPG", "b"), ("a.png", "a"), ("readme.md", "r"), ("c.jpeg", "c")],
        );

        let workspace = Workspace::reset(temp.child("work").path()).unwrap();
        workspace.unzip(archive.path()).unwrap();
        let images = workspace.sorted_images().unwrap();
        let zip_dir = workspace.archive_dir();
        assert_eq!(
            images,
            vec![zip_dir.join("a.png"), zip_dir.join("b.jpg"), zip_dir.join("c.jpeg")]
        );
    }

    #[test]
    fn test_pack_frames() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::reset(temp.child("work").path()).unwrap();
        for name in ["out002.png", "out001.png", "other.png", "out003.jpg"] {
            fs::write(workspace.join(name), name).unwrap();
        }

        let archive = workspace.pack_frames("out", "png", "frames.zip").unwrap();
        let zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let names: Vec<&str> = zip.file_names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"out001.png"));
        assert!(names.contains(&"out002.png"));
    }
}
