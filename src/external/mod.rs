//! Command line tools the archiver drives

use std::{
    ffi::OsStr,
    process::{Command, Stdio},
};

use log::debug;

use crate::storage::error::ArchiveError;

pub mod ffmpeg;
pub mod id3v2;

/// Runs `program` to completion and returns its standard output
pub fn run_command<I, S>(program: &str, args: I) -> Result<String, ArchiveError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    debug!("running {command:?}");

    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| ArchiveError::Command {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ArchiveError::CommandFailed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether `program` can be found on the PATH
pub fn command_exists(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
