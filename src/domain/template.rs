//! Rendering of the `%x` / `%x{n}` name patterns configured in the settings

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    config::Settings,
    domain::{
        format::{LowercaseWords, word_case, zero_pad},
        record::Record,
        track::Track,
    },
    storage::{error::ArchiveError, fs::Rename},
};

/// A `%` followed by a letter in either case, with an optional `{width}`
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"%([a-zA-Z])(\{\d+\})?").unwrap());

static PAD_WIDTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entity {
    Record,
    Track,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Numeric,
    Text,
}

/// Placeholders a pattern can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `%a`
    Artist,
    /// `%n`
    TrackNumber,
    /// `%r`
    RecordTitle,
    /// `%t`
    TrackTitle,
    /// `%y`
    Year,
}

impl Token {
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.to_ascii_lowercase().as_str() {
            "a" => Some(Token::Artist),
            "n" => Some(Token::TrackNumber),
            "r" => Some(Token::RecordTitle),
            "t" => Some(Token::TrackTitle),
            "y" => Some(Token::Year),
            _ => None,
        }
    }

    fn entity(self) -> Entity {
        match self {
            Token::Artist | Token::RecordTitle | Token::Year => Entity::Record,
            Token::TrackNumber | Token::TrackTitle => Entity::Track,
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Token::TrackNumber | Token::Year => ValueKind::Numeric,
            Token::Artist | Token::RecordTitle | Token::TrackTitle => ValueKind::Text,
        }
    }
}

/// The entity a pattern is rendered against
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Record(&'a Record),
    Track(&'a Track),
}

impl Subject<'_> {
    fn entity(&self) -> Entity {
        match self {
            Subject::Record(_) => Entity::Record,
            Subject::Track(_) => Entity::Track,
        }
    }

    /// Raw value behind `token`; unset values are empty
    fn value(&self, token: Token) -> String {
        let number = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
        match (self, token) {
            (Subject::Record(record), Token::Artist) => record.artist().to_string(),
            (Subject::Record(record), Token::RecordTitle) => record.title().to_string(),
            (Subject::Record(record), Token::Year) => number(record.year()),
            (Subject::Track(track), Token::TrackTitle) => track.title().to_string(),
            (Subject::Track(track), Token::TrackNumber) => number(track.track_number()),
            _ => String::new(),
        }
    }
}

/// Zero-pad width of a pattern: the first `{n}` anywhere in it, or 0.
///
/// Every numeric token of the pattern shares this width.
pub fn pad_width(pattern: &str) -> usize {
    PAD_WIDTH
        .captures(pattern)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Produces new record folder names and track file names from the settings' patterns
pub struct Renderer<'a> {
    settings: &'a Settings,
    lowercase: LowercaseWords,
}

impl<'a> Renderer<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            lowercase: settings.lowercase_words(),
        }
    }

    /// Substitutes every token of `pattern` that belongs to `subject`, in one pass.
    ///
    /// Numbers are zero-padded to the pattern's width, text is word-cased. Tokens of
    /// the other entity and unknown letters are left as they are.
    pub fn render(&self, pattern: &str, subject: Subject<'_>) -> String {
        let width = pad_width(pattern);

        TOKEN
            .replace_all(pattern, |caps: &Captures<'_>| {
                let Some(token) = Token::from_letter(&caps[1]) else {
                    return caps[0].to_string();
                };
                if token.entity() != subject.entity() {
                    return caps[0].to_string();
                }

                let value = subject.value(token);
                match token.kind() {
                    ValueKind::Numeric => zero_pad(&value, width),
                    ValueKind::Text => {
                        let braces = caps.get(2).map_or("", |m| m.as_str());
                        format!("{}{braces}", word_case(&value, &self.lowercase))
                    }
                }
            })
            .into_owned()
    }

    pub fn render_record(&self, record: &Record) -> String {
        self.render(self.settings.record_title(), Subject::Record(record))
    }

    pub fn render_track(&self, track: &Track) -> String {
        self.render(self.settings.track_title(), Subject::Track(track))
    }

    /// Renames every record folder and then its track files.
    ///
    /// Records must be ordered so that a folder comes before the folders containing it.
    /// The first failed rename aborts the run.
    /// Records already renamed inside a folder that moves afterwards are relocated with it.
    pub fn run(&self, records: &mut [Record], rename: &mut dyn Rename) -> Result<(), ArchiveError> {
        for i in 0..records.len() {
            let (done, rest) = records.split_at_mut(i);
            let record = &mut rest[0];

            let from = record.path();
            self.format_record(record, rename)?;
            let to = record.path();
            if from != to {
                for earlier in done.iter_mut() {
                    earlier.relocate(&from, &to);
                }
            }

            for track in record.tracks_mut() {
                self.format_track(track, rename)?;
            }
        }
        Ok(())
    }

    fn format_record(&self, record: &mut Record, rename: &mut dyn Rename) -> Result<(), ArchiveError> {
        let rendered = self.render_record(record);
        let new_name = rendered.trim();
        if new_name.is_empty() {
            warn!("empty name rendered for {}, keeping it", record.path().display());
            return Ok(());
        }

        let to = record.parent_dir().join(new_name);
        debug!("renaming record {} to {}", record.path().display(), to.display());
        rename.rename(&record.path(), &to)?;
        record.rename(new_name);
        Ok(())
    }

    fn format_track(&self, track: &mut Track, rename: &mut dyn Rename) -> Result<(), ArchiveError> {
        let rendered = self.render_track(track);
        let new_name = rendered.trim();
        if new_name.is_empty() {
            warn!("empty name rendered for {}, keeping it", track.path().display());
        } else {
            let to = track.dir().join(format!("{new_name}{}", track.extension()));
            rename.rename(&track.path(), &to)?;
            track.set_name(new_name);
        }

        track.apply_word_case(&self.lowercase);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::{Path, PathBuf},
    };

    use tempfile::tempdir;

    use super::*;
    use crate::domain::{field::TrackField, tags::fake::FakeTags};

    fn track(number: &str, title: &str) -> Track {
        let mut track = Track::from_path(Path::new("/music/Demo/old.mp3"));
        track.try_set(TrackField::TrackNumber, number);
        track.try_set(TrackField::Title, title);
        track
    }

    #[test]
    fn renders_track_pattern() {
        let settings = Settings::default();
        let renderer = Renderer::new(&settings);

        assert_eq!(renderer.render("%n{2} %t", Subject::Track(&track("7", "intro"))), "07 Intro");
        assert_eq!(renderer.render_track(&track("12", "lord of the flies")), "12 Lord of the Flies");
    }

    #[test]
    fn unset_values_render_empty_or_zeroes() {
        let settings = Settings::default();
        let renderer = Renderer::new(&settings);
        let track = Track::default();

        assert_eq!(renderer.render("%n{2} %t", Subject::Track(&track)), "00 ");
        assert_eq!(renderer.render("%n %t", Subject::Track(&track)), " ");
    }

    #[test]
    fn one_pad_width_per_pattern() {
        let settings = Settings::default();
        let renderer = Renderer::new(&settings);

        assert_eq!(pad_width("%n{3} %t"), 3);
        assert_eq!(pad_width("%t"), 0);
        assert_eq!(renderer.render("%n %n{3}", Subject::Track(&track("7", ""))), "007 007");
        assert_eq!(renderer.render("%n{2}", Subject::Track(&track("123", ""))), "23");
    }

    #[test]
    fn leaves_foreign_and_unknown_tokens() {
        let settings = Settings::default();
        let renderer = Renderer::new(&settings);

        assert_eq!(
            renderer.render("%a - %t %x", Subject::Track(&track("1", "intro"))),
            "%a - Intro %x"
        );
        assert_eq!(renderer.render("%t{2}", Subject::Track(&track("1", "intro"))), "Intro{2}");
    }

    #[test]
    fn token_letters_ignore_case() -> anyhow::Result<()> {
        let settings = Settings::from_toml("[track]\ntitle = \"%N{2} %T\"")?;
        let renderer = Renderer::new(&settings);

        assert_eq!(renderer.render_track(&track("7", "intro")), "07 Intro");
        assert_eq!(Token::from_letter("R"), Some(Token::RecordTitle));
        Ok(())
    }

    #[test]
    fn substituted_values_are_not_rendered_again() {
        let settings = Settings::default();
        let renderer = Renderer::new(&settings);

        assert_eq!(renderer.render("%t %n", Subject::Track(&track("5", "100%n"))), "100%n 5");
    }

    #[test]
    fn run_renames_records_then_tracks() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let dir = tmp.path().join("1994 - revolted masses - the demo");
        fs::create_dir(&dir)?;
        fs::write(dir.join("01_intro.mp3"), b"x")?;
        fs::write(dir.join("02_into the void.mp3"), b"x")?;

        let tags = FakeTags::default().with("01_intro.mp3", &[(TrackField::Band, "revolted masses")]);
        let mut records = vec![Record::load(&dir, &tags)?.unwrap()];
        let settings = Settings::default();
        let mut moves: Vec<(PathBuf, PathBuf)> = Vec::new();
        let mut rename = |from: &Path, to: &Path| -> Result<(), ArchiveError> {
            moves.push((from.to_path_buf(), to.to_path_buf()));
            Ok(())
        };

        Renderer::new(&settings).run(&mut records, &mut rename)?;

        let renamed = tmp.path().join("(1994) The Demo");
        assert_eq!(
            moves,
            vec![
                (dir.clone(), renamed.clone()),
                (renamed.join("01_intro.mp3"), renamed.join("01 Intro.mp3")),
                (
                    renamed.join("02_into the void.mp3"),
                    renamed.join("02 Into the Void.mp3")
                ),
            ]
        );

        let record = &records[0];
        assert_eq!(record.folder_name(), "(1994) The Demo");
        assert_eq!(record.tracks()[1].file_name(), "02 Into the Void.mp3");
        assert_eq!(record.tracks()[1].title(), "Into the Void");
        assert_eq!(record.tracks()[1].band(), "Revolted Masses");
        assert_eq!(record.tracks()[1].album(), "The Demo");
        Ok(())
    }

    #[test]
    fn run_stops_at_first_failed_rename() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let dir = tmp.path().join("Demo");
        fs::create_dir(&dir)?;
        fs::write(dir.join("01 a.mp3"), b"x")?;

        let mut records = vec![Record::load(&dir, &FakeTags::default())?.unwrap()];
        let settings = Settings::default();
        let mut calls = 0;
        let mut rename = |from: &Path, to: &Path| -> Result<(), ArchiveError> {
            calls += 1;
            Err(ArchiveError::Rename {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: std::io::Error::other("read-only"),
            })
        };

        let result = Renderer::new(&settings).run(&mut records, &mut rename);

        assert!(matches!(result, Err(ArchiveError::Rename { .. })));
        assert_eq!(calls, 1);
        assert_eq!(records[0].folder_name(), "Demo");
        Ok(())
    }
}
