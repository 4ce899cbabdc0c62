//! The human-readable log written into the target directory after a run

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Local};

use crate::{
    domain::record::Record,
    storage::{error::ArchiveError, fs::unique_file_name},
};

const LOG_PREFIX: &str = "archiver_log";

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackEntry {
    number: Option<u32>,
    title: String,
    file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordEntry {
    artist: String,
    title: String,
    year: Option<u32>,
    genre: String,
    tracks: Vec<TrackEntry>,
}

#[derive(Debug, Clone)]
pub struct RunLog {
    started_at: DateTime<Local>,
    records: Vec<RecordEntry>,
}

impl RunLog {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            started_at,
            records: Vec::new(),
        }
    }

    /// Takes a snapshot of `records` as they are now
    pub fn add_records(&mut self, records: &[Record]) {
        self.records.extend(records.iter().map(|record| RecordEntry {
            artist: record.artist().to_string(),
            title: record.title().to_string(),
            year: record.year(),
            genre: record.genre().to_string(),
            tracks: record
                .tracks()
                .iter()
                .map(|track| TrackEntry {
                    number: track.track_number(),
                    title: track.title().to_string(),
                    file_name: track.file_name(),
                })
                .collect(),
        }));
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn track_count(&self) -> usize {
        self.records.iter().map(|r| r.tracks.len()).sum()
    }

    pub fn file_name(&self) -> String {
        format!("{LOG_PREFIX}_{}.txt", self.started_at.format("%Y-%m-%d"))
    }

    pub fn render(&self, elapsed: Duration) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Audio archiver run at {} and completed successfully after {:.3} seconds",
            self.started_at.to_rfc2822(),
            elapsed.as_secs_f64()
        );
        out.push('\n');

        let records = self.record_count().to_string();
        let tracks = self.track_count().to_string();
        let pad = records.len().max(tracks.len());
        let _ = writeln!(out, "Records archived: {records:>pad$}");
        let _ = writeln!(out, "Tracks archived:  {tracks:>pad$}");
        out.push('\n');

        out.push_str("RECORD INFO\n");
        out.push_str(&"-".repeat("RECORD INFO".len()));
        out.push('\n');
        for record in &self.records {
            render_record(&mut out, record);
            out.push_str("\n\n");
        }
        out
    }

    /// Writes the log under a file name not yet taken in `dir`
    pub fn write(&self, dir: &Path, elapsed: Duration) -> Result<PathBuf, ArchiveError> {
        let name = unique_file_name(dir, &self.file_name()).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("could not find a free log file name in {}", dir.display()),
            )
        })?;
        let path = dir.join(name);
        std::fs::write(&path, self.render(elapsed))?;
        Ok(path)
    }
}

fn render_record(out: &mut String, record: &RecordEntry) {
    let year = record.year.map(|y| y.to_string()).unwrap_or_default();
    let _ = writeln!(out, "Artist:\t{}", record.artist);
    let _ = writeln!(out, "Title:\t{}", record.title);
    let _ = writeln!(out, "Year:\t{year}");
    let _ = writeln!(out, "Genre:\t{}", record.genre);
    out.push('\n');

    out.push_str("Tracks:\n");
    let rows: Vec<[String; 3]> = record
        .tracks
        .iter()
        .map(|track| {
            [
                format!("{:0>2}", track.number.unwrap_or(0)),
                track.title.clone(),
                track.file_name.clone(),
            ]
        })
        .collect();
    render_table(out, ["No", "Title", "Filename"], &rows);
}

/// Renders ` a | b | c` rows, each column as wide as its widest cell
fn render_table(out: &mut String, headers: [&str; 3], rows: &[[String; 3]]) {
    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let dashes = widths.map(|w| "-".repeat(w));
    let header = headers.map(str::to_string);
    for row in [&header, &dashes].into_iter().chain(rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!(" {cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" |");
        let _ = writeln!(out, "{}", line.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;
    use crate::domain::tags::fake::FakeTags;

    fn started_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap()
    }

    #[test]
    fn renders_statistics_and_track_table() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let dir = tmp.path().join("1994 - Revolted Masses - Demo");
        fs::create_dir(&dir)?;
        fs::write(dir.join("01_intro.mp3"), b"x")?;
        fs::write(dir.join("02_into the void.mp3"), b"x")?;
        let record = Record::load(&dir, &FakeTags::default())?.unwrap();

        let mut log = RunLog::new(started_at());
        log.add_records(&[record]);
        let text = log.render(Duration::from_millis(1500));

        assert_eq!(log.file_name(), "archiver_log_2024-03-09.txt");
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("Audio archiver run at Sat, "));
        assert!(lines[0].contains("Mar 2024 14:30:00"));
        assert!(lines[0].ends_with("after 1.500 seconds"));
        assert_eq!(lines[2], "Records archived: 1");
        assert_eq!(lines[3], "Tracks archived:  2");
        assert_eq!(lines[5], "RECORD INFO");
        assert_eq!(lines[6], "-----------");
        assert_eq!(lines[7], "Artist:\t");
        assert_eq!(lines[8], "Title:\tDemo");
        assert_eq!(lines[9], "Year:\t1994");
        assert_eq!(lines[10], "Genre:\t");
        assert_eq!(lines[12], "Tracks:");
        assert_eq!(lines[13], " No | Title         | Filename");
        assert_eq!(lines[14], " -- | ------------- | --------------------");
        assert_eq!(lines[15], " 01 | intro         | 01_intro.mp3");
        assert_eq!(lines[16], " 02 | into the void | 02_into the void.mp3");
        Ok(())
    }

    #[test]
    fn counts_are_aligned() {
        let mut log = RunLog::new(started_at());
        log.records = vec![
            RecordEntry {
                artist: String::new(),
                title: String::new(),
                year: None,
                genre: String::new(),
                tracks: vec![
                    TrackEntry {
                        number: None,
                        title: String::new(),
                        file_name: "a.mp3".into(),
                    };
                    12
                ],
            },
        ];

        let text = log.render(Duration::ZERO);

        assert!(text.contains("Records archived:  1\n"));
        assert!(text.contains("Tracks archived:  12\n"));
        assert!(text.contains(" 00 |       | a.mp3\n"));
    }

    #[test]
    fn write_never_overwrites_previous_log() -> anyhow::Result<()> {
        let tmp = tempdir()?;
        let log = RunLog::new(started_at());
        fs::write(tmp.path().join("archiver_log_2024-03-09.txt"), b"old")?;

        let path = log.write(tmp.path(), Duration::ZERO)?;

        assert_eq!(path, tmp.path().join("archiver_log_2024-03-09 (1).txt"));
        assert_eq!(
            fs::read_to_string(tmp.path().join("archiver_log_2024-03-09.txt"))?,
            "old"
        );
        Ok(())
    }
}
