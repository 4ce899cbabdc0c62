//! Tag reading and writing through the `id3v2` command line tool

use std::{ffi::OsStr, path::Path};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    domain::{
        field::TrackField,
        tags::{TagReader, TagWriter, Tags},
    },
    external::run_command,
    storage::{error::ArchiveError, fs::is_audio},
};

const PROGRAM: &str = "id3v2";

/// `id3v1 tag info for song.mp3:`
static SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^id3v([12]) tag info for ").unwrap());

/// `song.mp3: No ID3v1 tag`
static NO_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"No ID3v[12] tag$").unwrap());

/// Labels of the fixed-width ID3v1 listing
static V1_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(Title|Artist|Album|Year|Genre|Comment|Track)\s*:").unwrap()
});

/// Description and language in front of a comment, as in `()[eng]: text`
static COMMENT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(.*?\)\[.*?\]:\s?").unwrap());

/// [`TagReader`] and [`TagWriter`] backed by the `id3v2` program
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3v2;

impl Id3v2 {
    fn check(path: &Path) -> Result<(), ArchiveError> {
        if !is_audio(path) {
            return Err(ArchiveError::NotAudioFile(path.to_path_buf()));
        }
        Ok(())
    }
}

impl TagReader for Id3v2 {
    fn get_tags(&self, path: &Path) -> Result<Tags, ArchiveError> {
        Self::check(path)?;
        let listing = run_command(PROGRAM, [OsStr::new("-l"), path.as_os_str()])?;
        Ok(parse_listing(&listing))
    }
}

impl TagWriter for Id3v2 {
    /// Writes one frame per call, skipping empty values
    fn write_tags(&mut self, path: &Path, tags: &Tags) -> Result<(), ArchiveError> {
        Self::check(path)?;
        for (field, value) in tags.iter().filter(|(_, value)| !value.is_empty()) {
            let option = format!("--{}", field.tag_id());
            run_command(
                PROGRAM,
                [OsStr::new(&option), OsStr::new(value), path.as_os_str()],
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Version {
    V1,
    V2,
}

/// Lines of the `id3v1` and `id3v2` sections of an `id3v2 -l` listing
#[derive(Debug, Default)]
struct Sections<'a> {
    v1: Vec<&'a str>,
    v2: Vec<&'a str>,
}

fn split_sections(listing: &str) -> Sections<'_> {
    let mut sections = Sections::default();
    let mut current = None;

    for line in listing.lines() {
        if let Some(caps) = SECTION_HEADER.captures(line) {
            current = Some(match &caps[1] {
                "1" => Version::V1,
                _ => Version::V2,
            });
        } else if NO_TAG.is_match(line) {
            current = None;
        } else {
            match current {
                Some(Version::V1) => sections.v1.push(line),
                Some(Version::V2) => sections.v2.push(line),
                None => {}
            }
        }
    }
    sections
}

/// Extracts tags from `id3v2 -l` output, preferring ID3v2 frames over the ID3v1 block
pub fn parse_listing(listing: &str) -> Tags {
    let sections = split_sections(listing);
    if sections.v2.is_empty() {
        parse_v1(&sections.v1)
    } else {
        parse_v2(&sections.v2)
    }
}

/// Parses frame lines such as `TIT2 (Title/songname/content description): Intro`
fn parse_v2(lines: &[&str]) -> Tags {
    let mut tags = Tags::new();
    for line in lines {
        let id = line.split(' ').next().unwrap_or_default();
        let Some(field) = TrackField::from_tag_id(id) else {
            continue;
        };
        let Some((_, value)) = line.split_once(": ") else {
            continue;
        };

        let value = match field {
            TrackField::Comment => COMMENT_PREFIX.replace(value, "").into_owned(),
            _ => value.to_string(),
        };
        tags.insert(field, value.trim().to_string());
    }
    tags
}

fn v1_field(label: &str) -> Option<TrackField> {
    match label {
        "Title" => Some(TrackField::Title),
        "Artist" => Some(TrackField::Performer),
        "Album" => Some(TrackField::Album),
        "Year" => Some(TrackField::Year),
        "Genre" => Some(TrackField::Genre),
        "Comment" => Some(TrackField::Comment),
        "Track" => Some(TrackField::TrackNumber),
        _ => None,
    }
}

/// Parses the fixed-width block, e.g. `Album  : Demo     Year: 1994, Genre: Punk (43)`
fn parse_v1(lines: &[&str]) -> Tags {
    let text = lines.join(" ");
    let labels: Vec<_> = V1_LABEL.captures_iter(&text).collect();

    let mut tags = Tags::new();
    for (i, caps) in labels.iter().enumerate() {
        let (Some(label), Some(whole)) = (caps.get(1), caps.get(0)) else {
            continue;
        };
        let Some(field) = v1_field(label.as_str()) else {
            continue;
        };

        let end = labels
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let value = text[whole.end()..end].trim().trim_end_matches(',').trim();

        if !value.is_empty() {
            tags.entry(field).or_insert_with(|| value.to_string());
        }
    }
    tags
}
