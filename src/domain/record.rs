use std::path::{Path, PathBuf};

use log::debug;

use crate::{
    domain::{
        field::{RecordField, TRACK_TO_RECORD},
        heuristic,
        tags::{TagReader, TagWriter},
        track::Track,
    },
    storage::{error::ArchiveError, fs::audio_files},
};

/// How far a record has been processed. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Unresolved,
    Scanned,
    FieldsResolved,
    Normalized,
    Renamed,
}

/// Represent an album: a folder and the audio tracks directly inside it
#[derive(Debug, Clone)]
pub struct Record {
    folder_name: String,
    parent_dir: PathBuf,
    artist: String,
    title: String,
    year: Option<u32>,
    genre: String,
    tracks: Vec<Track>,
    stage: Stage,
}

impl Record {
    /// An unresolved record for the folder at `path`, or `None` when `path` is not a directory
    pub fn new(path: &Path) -> Option<Self> {
        if !path.is_dir() {
            return None;
        }
        let folder_name = path.file_name()?.to_string_lossy().into_owned();
        let parent_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Some(Self {
            folder_name,
            parent_dir,
            artist: String::new(),
            title: String::new(),
            year: None,
            genre: String::new(),
            tracks: Vec::new(),
            stage: Stage::Unresolved,
        })
    }

    /// Builds a fully resolved and normalized record out of the folder at `path`
    pub fn load(path: &Path, reader: &dyn TagReader) -> Result<Option<Self>, ArchiveError> {
        let Some(mut record) = Self::new(path) else {
            return Ok(None);
        };
        record.scan(reader)?;
        record.resolve_fields();
        record.normalize();
        Ok(Some(record))
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    pub fn parent_dir(&self) -> &Path {
        &self.parent_dir
    }

    pub fn path(&self) -> PathBuf {
        self.parent_dir.join(&self.folder_name)
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> Option<u32> {
        self.year
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, stage: Stage) {
        if stage > self.stage {
            self.stage = stage;
        }
    }

    pub fn get(&self, field: RecordField) -> String {
        match field {
            RecordField::Artist => self.artist.clone(),
            RecordField::Title => self.title.clone(),
            RecordField::Year => self.year.map(|y| y.to_string()).unwrap_or_default(),
            RecordField::Genre => self.genre.clone(),
        }
    }

    /// Sets `field` from text, returning whether the value was accepted.
    /// The year must be a positive integer, otherwise the previous year is kept.
    pub fn try_set(&mut self, field: RecordField, value: &str) -> bool {
        let value = value.trim();
        match field {
            RecordField::Artist => self.artist = value.to_string(),
            RecordField::Title => self.title = value.to_string(),
            RecordField::Genre => self.genre = value.to_string(),
            RecordField::Year => match value.parse::<u32>() {
                Ok(year) if year > 0 => self.year = Some(year),
                _ => return false,
            },
        }
        true
    }

    fn heuristic(&self, field: RecordField) -> Option<String> {
        match field {
            RecordField::Artist => {
                let parent_name = self
                    .parent_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                heuristic::record_artist(&self.folder_name, &parent_name)
            }
            RecordField::Title => heuristic::record_title(&self.folder_name),
            RecordField::Year => heuristic::record_year(&self.folder_name),
            RecordField::Genre => None,
        }
    }

    /// Creates one resolved track per audio file directly inside the folder,
    /// ordered by track number with unnumbered tracks first.
    pub fn scan(&mut self, reader: &dyn TagReader) -> Result<(), ArchiveError> {
        let mut tracks = Vec::new();
        for path in audio_files(&self.path())? {
            let mut track = Track::from_path(&path);
            track.resolve(reader)?;
            tracks.push(track);
        }
        tracks.sort_by_key(Track::track_number);

        debug!("found {} tracks in {}", tracks.len(), self.path().display());
        self.tracks = tracks;
        self.advance(Stage::Scanned);
        Ok(())
    }

    /// Fills the record fields from the first track that has them, then from the folder name.
    ///
    /// The artist is fed by both band and performer, so it is only ever taken from tracks.
    pub fn resolve_fields(&mut self) {
        self.advance(Stage::FieldsResolved);
        if self.tracks.is_empty() {
            return;
        }

        for (track_field, record_field) in &TRACK_TO_RECORD {
            if !self.get(*record_field).is_empty() {
                continue;
            }

            let mut value = self
                .tracks
                .iter()
                .map(|track| track.get(*track_field))
                .find(|value| !value.is_empty());

            if value.is_none() && !record_field.is_duplicate() {
                value = self.heuristic(*record_field);
            }

            if let Some(value) = value {
                self.try_set(*record_field, &value);
            }
        }
    }

    /// Copies every record field into the tracks where the matching field is empty
    pub fn normalize(&mut self) {
        for (track_field, record_field) in TRACK_TO_RECORD {
            let value = self.get(record_field);
            if value.is_empty() {
                continue;
            }
            for track in &mut self.tracks {
                if track.get(track_field).is_empty() {
                    track.try_set(track_field, &value);
                }
            }
        }
        self.advance(Stage::Normalized);
    }

    /// Renames the folder in memory and points every track at the new location.
    ///
    /// Returns false, changing nothing, when `folder_name` is blank.
    pub fn rename(&mut self, folder_name: &str) -> bool {
        let folder_name = folder_name.trim();
        if folder_name.is_empty() {
            return false;
        }

        self.folder_name = folder_name.to_string();
        let path = self.path();
        for track in &mut self.tracks {
            track.set_dir(&path);
        }
        self.advance(Stage::Renamed);
        true
    }

    /// Follows a move of an enclosing folder from `from` to `to`.
    /// Records outside of `from` are left alone.
    pub fn relocate(&mut self, from: &Path, to: &Path) {
        let Ok(rest) = self.parent_dir.strip_prefix(from) else {
            return;
        };
        self.parent_dir = if rest.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(rest)
        };

        let path = self.path();
        for track in &mut self.tracks {
            track.set_dir(&path);
        }
    }

    pub fn write_track_metadata(&self, writer: &mut dyn TagWriter) -> Result<(), ArchiveError> {
        for track in &self.tracks {
            writer.write_tags(&track.path(), &track.serialize())?;
        }
        Ok(())
    }
}
