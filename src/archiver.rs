use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, anyhow};
use chrono::Local;
use log::{info, warn};

use crate::{
    config::Settings,
    domain::{
        record::Record,
        tags::{TagReader, TagWriter},
        template::Renderer,
    },
    external::ffmpeg::Encoder,
    report::RunLog,
    storage::{
        error::ArchiveError,
        fs::{FileHandler, find_record_dirs, unique_file_name},
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Re-encode every track at the configured bitrate
    pub convert: bool,
    /// Only log moves, and skip everything that would touch files
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct RunSummary {
    pub records: usize,
    pub tracks: usize,
    /// Where the run log was written; none in dry-run mode
    pub log_path: Option<PathBuf>,
}

/// Main structure that drives one run over a target directory
pub struct Archiver<T> {
    dir: PathBuf,
    settings: Settings,
    options: Options,
    tags: T,
    files: FileHandler,
}

impl<T: TagReader + TagWriter> Archiver<T> {
    pub fn new(
        dir: &Path,
        settings: Settings,
        options: Options,
        tags: T,
    ) -> Result<Self, ArchiveError> {
        if !dir.is_dir() {
            return Err(ArchiveError::NotADirectory(dir.to_path_buf()));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            settings,
            options,
            tags,
            files: FileHandler::new(options.dry_run),
        })
    }

    /// Detects records, renames them and their tracks, writes tags back,
    /// optionally converts, and writes the run log.
    ///
    /// `encoder` is required when conversion is enabled.
    pub fn run(&mut self, encoder: Option<&mut dyn Encoder>) -> anyhow::Result<RunSummary> {
        let started_at = Local::now();
        let timer = Instant::now();
        let mut log = RunLog::new(started_at);

        info!("Executing archiver in {}", self.dir.display());

        info!("Getting record info...");
        let mut records = self.detect_records()?;
        log.add_records(&records);
        let root = records.iter().position(|r| r.path() == self.dir);

        info!("Formatting file names...");
        Renderer::new(&self.settings)
            .run(&mut records, &mut self.files)
            .context("failed to rename records")?;

        if self.options.dry_run {
            info!("Dry run, skipping metadata, conversion and log");
            return Ok(RunSummary {
                records: log.record_count(),
                tracks: log.track_count(),
                log_path: None,
            });
        }

        info!("Writing audio files metadata...");
        self.write_metadata(&records)?;

        if self.options.convert {
            let encoder = encoder.ok_or_else(|| anyhow!("conversion requested without an encoder"))?;
            info!("Converting audio files...");
            self.convert(&records, encoder)?;
        }

        // The target directory is itself renamed when it holds tracks
        let log_dir = root.map_or_else(|| self.dir.clone(), |i| records[i].path());
        info!("Writing log...");
        let log_path = log
            .write(&log_dir, timer.elapsed())
            .with_context(|| format!("failed to write run log in {}", log_dir.display()))?;

        info!("Done!");
        Ok(RunSummary {
            records: log.record_count(),
            tracks: log.track_count(),
            log_path: Some(log_path),
        })
    }

    fn detect_records(&self) -> anyhow::Result<Vec<Record>> {
        let mut records = Vec::new();
        for folder in find_record_dirs(&self.dir)? {
            match Record::load(&folder, &self.tags)
                .with_context(|| format!("failed to read record {}", folder.display()))?
            {
                Some(record) => records.push(record),
                None => warn!("skipping {}: not a directory", folder.display()),
            }
        }
        Ok(records)
    }

    fn write_metadata(&mut self, records: &[Record]) -> anyhow::Result<()> {
        for record in records {
            record
                .write_track_metadata(&mut self.tags)
                .with_context(|| format!("failed to write tags in {}", record.path().display()))?;
        }
        Ok(())
    }

    /// Encodes each track into a free sibling file name, then moves it over the original
    fn convert(&self, records: &[Record], encoder: &mut dyn Encoder) -> anyhow::Result<()> {
        let bitrate = self.settings.bitrate();
        let total: usize = records.iter().map(|r| r.tracks().len()).sum();
        let width = total.to_string().len();

        let mut done = 0;
        for record in records {
            let dir = record.path();
            for track in record.tracks() {
                done += 1;
                info!("Converting {done:>width$}/{total}...");

                let path = track.path();
                let name = unique_file_name(&dir, &track.file_name())
                    .ok_or_else(|| anyhow!("no free file name for {}", path.display()))?;
                let converted = dir.join(name);

                encoder
                    .encode(&path, &converted, bitrate)
                    .with_context(|| format!("failed to convert {}", path.display()))?;
                self.files.move_path(&converted, &path)?;
            }
        }
        Ok(())
    }
}
