use std::{path::PathBuf, process::ExitStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{} is not an audio file", .0.display())]
    NotAudioFile(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("could not rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} needs to be installed")]
    MissingProgram(String),

    #[error("failed to execute {program}: {source}")]
    Command {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),
}
