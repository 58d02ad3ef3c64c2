use std::path::PathBuf;

use ffmpeg_cmdline_utils::FfmpegError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for the various reasons why frames could not be extracted from a video.
///
/// The first five variants are checked in the order listed, before any expensive work is done.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtractionError {
    /// There is nothing at the supplied video path.
    #[error("No video found at '{0}' for frame extraction")]
    VideoNotFound(PathBuf),

    /// The directory that the frames are to be written into does not exist.
    #[error("No directory called '{0}' found for storing the frames")]
    OutputDirectoryNotFound(PathBuf),

    /// The sampling interval must be a finite number greater than zero.
    #[error("Invalid sampling interval: {0}")]
    InvalidInterval(f64),

    /// ffmpeg could not be found, either at the explicit location supplied or on the command line.
    #[error(transparent)]
    ToolNotFound(FfmpegError),

    /// The program found in place of ffmpeg cannot be run, or does not identify itself as ffmpeg.
    #[error(transparent)]
    ToolInvalid(FfmpegError),

    /// ffmpeg ran, but did not write any frames. Contains the command that was run and
    /// (the start of) everything ffmpeg printed.
    #[error("ffmpeg could not extract any frames.\n{command}\n{output}")]
    NoFramesExtracted { command: String, output: String },

    /// ffmpeg could not be run to completion (e.g. it timed out).
    #[error("ffmpeg failed while running '{command}': {error}")]
    Ffmpeg { command: String, error: FfmpegError },

    /// The output directory could not be read after extraction.
    #[error("IO error reading '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Errors from locating and validating ffmpeg. Anything that stopped the tool from being found is
/// `ToolNotFound`; every other failure means the tool could not be validated.
impl From<FfmpegError> for ExtractionError {
    fn from(e: FfmpegError) -> Self {
        match e {
            FfmpegError::ToolNotFound { .. } => ExtractionError::ToolNotFound(e),
            e => ExtractionError::ToolInvalid(e),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_tool_errors_are_classified() {
        let not_found = FfmpegError::ToolNotFound { path: None };
        assert_eq!(
            ExtractionError::from(not_found.clone()),
            ExtractionError::ToolNotFound(not_found)
        );

        for error in [
            FfmpegError::ToolInvalid {
                path: PathBuf::from("/usr/bin/echo"),
                output: "-version".to_string(),
            },
            FfmpegError::Io("Uncategorized: Exec format error (os error 8)".to_string()),
            FfmpegError::Timeout {
                command: "ffmpeg -version".to_string(),
                timeout: Duration::from_secs(60),
            },
        ] {
            assert_eq!(ExtractionError::from(error.clone()), ExtractionError::ToolInvalid(error));
        }
    }
}
