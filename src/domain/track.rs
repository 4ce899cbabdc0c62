use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    domain::{
        field::TrackField,
        format::{LowercaseWords, word_case},
        heuristic,
        tags::{TagReader, Tags},
    },
    storage::error::ArchiveError,
};

/// Numeric genre code some taggers append, as in `Rock (17)`
static GENRE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\(\d+\)$").unwrap());

/// Total track count appended to the track number, as in `3/12`
static TRACK_TOTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+$").unwrap());

/// Represent one audio file and its metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    title: String,
    performer: String,
    band: String,
    album: String,
    year: Option<u32>,
    genre: String,
    comment: String,
    track_number: Option<u32>,

    dir: PathBuf,
    /// File name without extension
    name: String,
    /// Extension including the leading dot, or empty
    extension: String,
}

impl Track {
    /// A track with no metadata yet, pointing at `path`
    pub fn from_path(path: &Path) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        Self {
            dir,
            name,
            extension,
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn performer(&self) -> &str {
        &self.performer
    }

    pub fn band(&self) -> &str {
        &self.band
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn year(&self) -> Option<u32> {
        self.year
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn track_number(&self) -> Option<u32> {
        self.track_number
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }

    /// Moves the in-memory file reference to another directory. Blank paths are ignored.
    pub fn set_dir(&mut self, dir: &Path) {
        if !dir.as_os_str().is_empty() {
            self.dir = dir.to_path_buf();
        }
    }

    /// Renames the in-memory file reference, keeping the extension. Blank names are ignored.
    pub fn set_name(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.name = name.to_string();
        }
    }

    /// Current value of `field` as text; unset numbers are empty
    pub fn get(&self, field: TrackField) -> String {
        let number = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
        match field {
            TrackField::Title => self.title.clone(),
            TrackField::Performer => self.performer.clone(),
            TrackField::Band => self.band.clone(),
            TrackField::Album => self.album.clone(),
            TrackField::Year => number(self.year),
            TrackField::Genre => self.genre.clone(),
            TrackField::Comment => self.comment.clone(),
            TrackField::TrackNumber => number(self.track_number),
        }
    }

    /// Sets `field` from text, returning whether the value was accepted.
    ///
    /// Text fields are trimmed. Year and track number must be positive integers,
    /// otherwise the previous value is kept.
    pub fn try_set(&mut self, field: TrackField, value: &str) -> bool {
        let value = value.trim();
        match field {
            TrackField::Title => self.title = value.to_string(),
            TrackField::Performer => self.performer = value.to_string(),
            TrackField::Band => self.band = value.to_string(),
            TrackField::Album => self.album = value.to_string(),
            TrackField::Genre => self.genre = GENRE_CODE.replace(value, "").into_owned(),
            TrackField::Comment => self.comment = value.to_string(),
            TrackField::Year => match leading_positive(value) {
                Some(year) => self.year = Some(year),
                None => return false,
            },
            TrackField::TrackNumber => match positive(&TRACK_TOTAL.replace(value, "")) {
                Some(number) => self.track_number = Some(number),
                None => return false,
            },
        }
        true
    }

    fn heuristic(&self, field: TrackField) -> Option<String> {
        match field {
            TrackField::Title => heuristic::track_title(&self.file_name(), &self.extension),
            TrackField::TrackNumber => heuristic::track_number(&self.file_name()),
            _ => None,
        }
    }

    /// Fills every field from the file's tags, falling back to its file name for
    /// the title and the track number.
    pub fn resolve(&mut self, reader: &dyn TagReader) -> Result<(), ArchiveError> {
        let tags = reader.get_tags(&self.path())?;

        for field in TrackField::ALL {
            let value = tags
                .get(&field)
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .or_else(|| self.heuristic(field));

            if let Some(value) = value {
                self.try_set(field, &value);
            }
        }
        Ok(())
    }

    /// Re-applies word casing to the free-text fields
    pub fn apply_word_case(&mut self, lowercase: &LowercaseWords) {
        for field in TrackField::WORD_CASED {
            let cased = word_case(&self.get(field), lowercase);
            self.try_set(field, &cased);
        }
    }

    /// Current metadata keyed by tag field, ready to be written back
    pub fn serialize(&self) -> Tags {
        TrackField::ALL
            .into_iter()
            .map(|field| (field, self.get(field)))
            .collect()
    }
}

fn positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// Like [`positive`], but tolerates trailing text such as in `1994-05-01`
fn leading_positive(value: &str) -> Option<u32> {
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    positive(&digits)
}
