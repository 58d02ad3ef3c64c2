use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for the various reasons why a montage could not be assembled.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MontageError {
    /// No frames were supplied, so there is nothing to put in the montage.
    #[error("Cannot assemble a montage from zero frames")]
    EmptyFrameSet,

    /// The directory that the montage is to be written into does not exist.
    #[error("No directory called '{0}' found for storing the montage")]
    DestinationNotFound(PathBuf),

    /// One of the frames could not be opened or decoded.
    #[error("Failed to read frame '{path}': {error}")]
    ImageRead { path: PathBuf, error: String },

    /// The montage could not be encoded or written.
    #[error("Failed to write montage '{path}': {error}")]
    ImageWrite { path: PathBuf, error: String },
}
