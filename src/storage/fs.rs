//! Module to find record folders and move things around in the file system

use log::{debug, warn};
use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use crate::storage::error::ArchiveError;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// Upper bound of the ` (i)` suffix tried by [`unique_file_name`]
const UNIQUE_NAME_LIMIT: u32 = 100;

pub fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Audio files placed directly inside `dir`, sorted by file name
pub fn audio_files(dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_audio(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Returns every folder under `root` (including `root` itself) that directly contains audio.
///
/// Sub-folders come reverse-sorted, so a folder is always listed before its parent,
/// and `root` comes last. Renaming in this order never invalidates a path that is still
/// waiting to be processed.
pub fn find_record_dirs(root: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    if !root.is_dir() {
        return Err(ArchiveError::NotADirectory(root.to_path_buf()));
    }
    let root_str = root.to_string_lossy();

    let mut folders = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("error while scanning dir {root_str}, skipping an entry: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect::<Vec<PathBuf>>();
    folders.sort();
    folders.reverse();
    folders.push(root.to_path_buf());

    let mut records = Vec::new();
    for folder in folders {
        if !audio_files(&folder)?.is_empty() {
            records.push(folder);
        }
    }
    Ok(records)
}

/// Finds a name for `file_name` that is not taken inside `dir`.
///
/// `song.mp3` becomes `song (1).mp3`, `song (2).mp3` and so on. Returns `None` when
/// `dir` is not a directory, the name is empty, or every candidate is taken.
pub fn unique_file_name(dir: &Path, file_name: &str) -> Option<String> {
    if !dir.is_dir() || file_name.is_empty() {
        return None;
    }
    if !dir.join(file_name).exists() {
        return Some(file_name.to_string());
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..=UNIQUE_NAME_LIMIT)
        .map(|i| format!("{stem} ({i}){ext}"))
        .find(|candidate| !dir.join(candidate).exists())
}

/// Injectable rename operation, called for every record and track name change
pub trait Rename {
    fn rename(&mut self, from: &Path, to: &Path) -> Result<(), ArchiveError>;
}

impl<F> Rename for F
where
    F: FnMut(&Path, &Path) -> Result<(), ArchiveError>,
{
    fn rename(&mut self, from: &Path, to: &Path) -> Result<(), ArchiveError> {
        self(from, to)
    }
}

/// Moves files and folders. In dry-run mode moves are only logged.
#[derive(Debug, Default, Clone)]
pub struct FileHandler {
    dry_run: bool,
}

impl FileHandler {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn move_path(&self, from: &Path, to: &Path) -> Result<(), ArchiveError> {
        if self.dry_run {
            debug!("[Debug] Moving {} to {}", from.display(), to.display());
            return Ok(());
        }

        std::fs::rename(from, to).map_err(|source| ArchiveError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
    }
}

impl Rename for FileHandler {
    fn rename(&mut self, from: &Path, to: &Path) -> Result<(), ArchiveError> {
        self.move_path(from, to)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn audio_check_is_case_insensitive() {
        assert!(is_audio(Path::new("/music/01 Intro.MP3")));
        assert!(is_audio(Path::new("take.wav")));
        assert!(!is_audio(Path::new("cover.jpg")));
        assert!(!is_audio(Path::new("song.flac")));
        assert!(!is_audio(Path::new("mp3")));
    }

    #[test]
    fn audio_files_lists_only_direct_children() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        fs::write(root.join("02 b.mp3"), b"b")?;
        fs::write(root.join("01 a.wav"), b"a")?;
        fs::write(root.join("notes.txt"), b"x")?;
        fs::create_dir(root.join("nested"))?;
        fs::write(root.join("nested").join("03 c.mp3"), b"c")?;

        let files = audio_files(root)?;

        assert_eq!(files, vec![root.join("01 a.wav"), root.join("02 b.mp3")]);
        Ok(())
    }

    #[test]
    fn record_dirs_are_deepest_first_with_root_last() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        let artist = root.join("Artist");
        let album = artist.join("1994 - Demo");
        let empty = root.join("Scans");
        fs::create_dir_all(&album)?;
        fs::create_dir_all(&empty)?;

        fs::write(root.join("loose.mp3"), b"x")?;
        fs::write(artist.join("single.mp3"), b"x")?;
        fs::write(album.join("01 Intro.mp3"), b"x")?;
        fs::write(empty.join("cover.jpg"), b"x")?;

        let dirs = find_record_dirs(root)?;

        assert_eq!(dirs, vec![album, artist, root.to_path_buf()]);
        Ok(())
    }

    #[test]
    fn record_dirs_rejects_files() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let file = tmp.path().join("song.mp3");
        fs::write(&file, b"x")?;

        let err = find_record_dirs(&file).unwrap_err();

        assert!(matches!(err, ArchiveError::NotADirectory(..)));
        Ok(())
    }

    #[test]
    fn unique_file_name_appends_counter() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let dir = tmp.path();

        assert_eq!(unique_file_name(dir, "song.mp3").as_deref(), Some("song.mp3"));

        fs::write(dir.join("song.mp3"), b"x")?;
        fs::write(dir.join("song (1).mp3"), b"x")?;

        assert_eq!(
            unique_file_name(dir, "song.mp3").as_deref(),
            Some("song (2).mp3")
        );
        assert_eq!(unique_file_name(dir, ""), None);
        assert_eq!(unique_file_name(&dir.join("missing"), "song.mp3"), None);
        Ok(())
    }

    #[test]
    fn dry_run_leaves_files_in_place() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let from = tmp.path().join("a.mp3");
        let to = tmp.path().join("b.mp3");
        fs::write(&from, b"x")?;

        FileHandler::new(true).move_path(&from, &to)?;
        assert!(from.exists());
        assert!(!to.exists());

        FileHandler::new(false).move_path(&from, &to)?;
        assert!(!from.exists());
        assert!(to.exists());
        Ok(())
    }

    #[test]
    fn failed_move_reports_both_paths() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let from = tmp.path().join("missing.mp3");
        let to = tmp.path().join("b.mp3");

        let err = FileHandler::new(false).move_path(&from, &to).unwrap_err();

        match err {
            ArchiveError::Rename { from: f, to: t, .. } => {
                assert_eq!(f, from);
                assert_eq!(t, to);
            }
            other => panic!("unexpected error {other:?}"),
        }
        Ok(())
    }
}
