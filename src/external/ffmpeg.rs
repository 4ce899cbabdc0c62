use std::{ffi::OsStr, path::Path};

use crate::{
    external::{command_exists, run_command},
    storage::error::ArchiveError,
};

const PROGRAM: &str = "ffmpeg";

/// Re-encodes audio at a given bitrate
pub trait Encoder {
    /// Encodes `from` into the new file `to`, at `bitrate` kbit/s
    fn encode(&mut self, from: &Path, to: &Path, bitrate: u32) -> Result<(), ArchiveError>;
}

/// [`Encoder`] backed by the `ffmpeg` program
#[derive(Debug, Clone, Copy)]
pub struct Ffmpeg(());

impl Ffmpeg {
    /// Fails with [`ArchiveError::MissingProgram`] when ffmpeg is not installed
    pub fn detect() -> Result<Self, ArchiveError> {
        if !command_exists(PROGRAM) {
            return Err(ArchiveError::MissingProgram(PROGRAM.to_string()));
        }
        Ok(Self(()))
    }
}

impl Encoder for Ffmpeg {
    fn encode(&mut self, from: &Path, to: &Path, bitrate: u32) -> Result<(), ArchiveError> {
        let bitrate = format!("{bitrate}k");
        run_command(
            PROGRAM,
            [
                OsStr::new("-loglevel"),
                OsStr::new("quiet"),
                OsStr::new("-i"),
                from.as_os_str(),
                OsStr::new("-b:a"),
                OsStr::new(&bitrate),
                to.as_os_str(),
            ],
        )?;
        Ok(())
    }
}
