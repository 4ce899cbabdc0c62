use std::{collections::BTreeMap, path::Path};

use crate::{domain::field::TrackField, storage::error::ArchiveError};

/// Tag values keyed by the field they belong to
pub type Tags = BTreeMap<TrackField, String>;

/// Reads embedded tags out of an audio file
pub trait TagReader {
    /// Fails with [`ArchiveError::NotAudioFile`] for anything [`crate::storage::fs::is_audio`] rejects
    fn get_tags(&self, path: &Path) -> Result<Tags, ArchiveError>;
}

/// Writes embedded tags into an audio file
pub trait TagWriter {
    fn write_tags(&mut self, path: &Path, tags: &Tags) -> Result<(), ArchiveError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{
        collections::HashMap,
        path::{Path, PathBuf},
    };

    use super::*;
    use crate::storage::fs::is_audio;

    /// In-memory tags keyed by file name; files without an entry have no tags
    #[derive(Debug, Default)]
    pub(crate) struct FakeTags {
        pub by_name: HashMap<String, Tags>,
        pub written: Vec<(PathBuf, Tags)>,
    }

    impl FakeTags {
        pub fn with(mut self, file_name: &str, tags: &[(TrackField, &str)]) -> Self {
            let tags = tags
                .iter()
                .map(|(field, value)| (*field, value.to_string()))
                .collect();
            self.by_name.insert(file_name.to_string(), tags);
            self
        }
    }

    impl TagReader for FakeTags {
        fn get_tags(&self, path: &Path) -> Result<Tags, ArchiveError> {
            if !is_audio(path) {
                return Err(ArchiveError::NotAudioFile(path.to_path_buf()));
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(self.by_name.get(&name).cloned().unwrap_or_default())
        }
    }

    impl TagWriter for FakeTags {
        fn write_tags(&mut self, path: &Path, tags: &Tags) -> Result<(), ArchiveError> {
            if !is_audio(path) {
                return Err(ArchiveError::NotAudioFile(path.to_path_buf()));
            }
            self.written.push((path.to_path_buf(), tags.clone()));
            Ok(())
        }
    }
}
