use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Various causes of failure when locating or running ffmpeg.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FfmpegError {
    /// Ffmpeg could not be found. If `path` is None then ffmpeg was searched for on the command line
    /// (the PATH environment variable); otherwise `path` is the explicit location that was tried.
    #[error("{}", tool_not_found_msg(.path))]
    ToolNotFound { path: Option<PathBuf> },

    /// An executable was found, but running it with `-version` did not print the ffmpeg banner.
    /// `output` holds the first few hundred characters of what it printed instead.
    #[error("The program at '{path}' is not ffmpeg. Output of '-version' was: {output}")]
    ToolInvalid { path: PathBuf, output: String },

    /// Io error occurred while executing an ffmpeg command
    #[error("Ffmpeg IO error: {0}")]
    Io(String),

    /// The command did not finish before its timeout and was killed.
    #[error("Ffmpeg command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },
}

fn tool_not_found_msg(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!("ffmpeg not found at '{}'", path.display()),
        None => "ffmpeg is not on the command line. Install ffmpeg and add it to PATH, \
                 or supply an explicit path to it"
            .to_string(),
    }
}

impl From<std::io::Error> for FfmpegError {
    fn from(e: std::io::Error) -> Self {
        FfmpegError::Io(format!("{:?}: {}", e.kind(), e))
    }
}
