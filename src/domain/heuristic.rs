//! Guessing metadata from file and folder names, used when tags are missing

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `03_Intro.mp3`, `7 - Outro.wav`: one or two leading digits and a delimiter
static TRACK_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{1,2})[\W_](.*)$").unwrap());

/// `1994 - Title`, `(1994) Title`
static LEADING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\W?([0-9]{4})\W?\s+(?:-\s+)?(.*)$").unwrap());

/// `Title - 1994`, `Title (1994)`
static TRAILING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s+(?:-\s+)?\W?([0-9]{4})\W?$").unwrap());

/// Track number from a file name such as `03_Intro.mp3`
pub fn track_number(file_name: &str) -> Option<String> {
    TRACK_PREFIX
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}

/// Track title from a file name such as `03_Intro.mp3`, without `extension`.
///
/// Names without a track number prefix yield nothing.
pub fn track_title(file_name: &str, extension: &str) -> Option<String> {
    let rest = TRACK_PREFIX.captures(file_name)?.get(2)?.as_str();
    let title = match extension {
        "" => rest,
        ext => rest.strip_suffix(ext).unwrap_or(rest),
    };
    non_empty(title)
}

/// The parts a folder name is made of
#[derive(Debug, Clone, PartialEq, Eq)]
struct FolderName<'a> {
    year: Option<&'a str>,
    text: &'a str,
}

fn text_of<'h>(caps: &Captures<'h>, i: usize) -> &'h str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn split_folder_name(name: &str) -> FolderName<'_> {
    if let Some(caps) = LEADING_YEAR.captures(name) {
        return FolderName {
            year: caps.get(1).map(|m| m.as_str()),
            text: text_of(&caps, 2),
        };
    }
    if let Some(caps) = TRAILING_YEAR.captures(name) {
        return FolderName {
            year: caps.get(2).map(|m| m.as_str()),
            text: text_of(&caps, 1),
        };
    }
    FolderName {
        year: None,
        text: name,
    }
}

fn segments(text: &str) -> Vec<&str> {
    text.split('-').map(str::trim).collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Year from a folder name such as `1994 - Demo` or `Demo (1994)`
pub fn record_year(folder_name: &str) -> Option<String> {
    split_folder_name(folder_name).year.map(str::to_string)
}

/// Artist from a folder name such as `1994 - Artist - Title`.
///
/// A folder name with no `-` separator carries no artist, in which case the name of
/// the folder holding the record (`parent_name`) is used instead.
pub fn record_artist(folder_name: &str, parent_name: &str) -> Option<String> {
    let segments = segments(split_folder_name(folder_name).text);
    match segments.as_slice() {
        [first, _, ..] => non_empty(first),
        _ => non_empty(parent_name),
    }
}

/// Title from a folder name: the last `-` separated segment once the year is removed
pub fn record_title(folder_name: &str) -> Option<String> {
    segments(split_folder_name(folder_name).text)
        .last()
        .and_then(|title| non_empty(title))
}
