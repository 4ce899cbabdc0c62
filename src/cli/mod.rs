use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use crate::archiver::{Archiver, Options};
use crate::config::Settings;
use crate::external::{
    ffmpeg::{Encoder, Ffmpeg},
    id3v2::Id3v2,
};
use crate::storage::error::ArchiveError;

#[derive(Parser)]
#[command(name = "archiver")]
#[command(version = "0.1")]
#[command(about = "Normalizes tags and file names of a music library")]
pub struct Cli {
    /// Directory holding the records to archive
    pub dir: PathBuf,

    /// Re-encode every track at the configured bitrate (requires ffmpeg)
    #[arg(short, long)]
    pub convert: bool,

    /// Log file moves instead of performing them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Path to a TOML file overriding the default settings
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
}

impl Cli {
    /// Log level used when `RUST_LOG` is unset. Dry runs report their moves at debug level.
    fn default_log_filter(&self) -> &'static str {
        if self.dry_run { "debug" } else { "info" }
    }
}

/// Entrypoint for CLI
pub fn run() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.default_log_filter())).init();

    if let Err(e) = archive(&cli) {
        eprintln!("[Error] {e:#}");
        std::process::exit(1);
    }
}

fn archive(cli: &Cli) -> anyhow::Result<()> {
    if !cli.dir.is_dir() {
        return Err(ArchiveError::NotADirectory(cli.dir.clone()).into());
    }
    let dir = cli
        .dir
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", cli.dir.display()))?;

    let settings = match &cli.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let options = Options {
        convert: cli.convert,
        dry_run: cli.dry_run,
    };

    let mut ffmpeg = if options.convert && !options.dry_run {
        Some(Ffmpeg::detect()?)
    } else {
        None
    };

    let mut archiver = Archiver::new(&dir, settings, options, Id3v2)?;
    let summary = archiver.run(ffmpeg.as_mut().map(|f| f as &mut dyn Encoder))?;

    info!(
        "Archived {} records with {} tracks",
        summary.records, summary.tracks
    );
    if let Some(path) = summary.log_path {
        info!("Run log written to {}", path.display());
    }
    Ok(())
}
