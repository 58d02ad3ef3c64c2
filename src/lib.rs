#![allow(clippy::let_and_return)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]

//! # Overview
//! videohash_frames turns a video file into a single montage image which can then be fed to a
//! perceptual image hash, so that near-duplicate videos end up with near-identical hashes.
//!
//! # How it works
//! * ffmpeg's `cropdetect` filter is run at up to twelve points in the video (2 seconds in, 5 seconds
//!   in, ... up to four hours in). The most commonly reported crop is used to remove letterboxing and
//!   pillarboxing, so that the same film with and without black bars produces the same frames.
//! * ffmpeg then writes one 144x144 frame per sampling interval into an output directory, named
//!   `video_frame_0000001.jpeg`, `video_frame_0000002.jpeg` and so on.
//! * The frames are tiled, in order, into a montage that is as close to square as possible.
//!
//! ```no_run
//! use videohash_frames::{assemble_montage, extract_frames, TaskWorkspace};
//!
//! let workspace = TaskWorkspace::create(None).unwrap();
//!
//! // The duration of the video is supplied by the caller.
//! let frames = extract_frames("rocket.mkv", workspace.frames_dir(), 52.3, 1.0, None).unwrap();
//! let montage = assemble_montage(&frames, workspace.montage_path(), 720).unwrap();
//! ```
//!
//! Extraction is split into a validation step and an execution step, so that bad inputs can be
//! rejected without decoding anything:
//!
//! ```no_run
//! use videohash_frames::{ExtractionError, FramesExtractorBuilder};
//!
//! let extractor = match FramesExtractorBuilder::new("rocket.mkv", "/tmp/frames", 52.3).build() {
//!     Ok(extractor) => extractor,
//!     Err(ExtractionError::ToolNotFound(e)) => panic!("please install ffmpeg: {e}"),
//!     Err(e) => panic!("{e}"),
//! };
//! let frames = extractor.extract().unwrap();
//! ```
//!
//! # Prerequisites
//! This crate calls ffmpeg from the command line. Either make ffmpeg available on the command line,
//! for example:
//!
//! * Debian-based systems: ```# apt-get install ffmpeg```
//! * Yum-based systems: ```# yum install ffmpeg```
//! * Windows:
//!     1) Download the correct installer from <https://ffmpeg.org/download.html>
//!     2) Run the installer and install ffmpeg to any directory
//!     3) Add the directory into the PATH environment variable
//!
//! or pass its location explicitly.

pub mod definitions;
pub mod frame_extraction;
pub mod montage;
pub mod utils;

pub use ffmpeg_cmdline_utils::{locate_and_validate_ffmpeg, FfmpegError};

pub use frame_extraction::{
    detect_crop, extract_frames, CropDetector, CropRegion, CropSpec, Cropdetect, ExtractionError,
    ExtractionOptions, FrameFile, FramesExtractor, FramesExtractorBuilder,
};
pub use montage::{assemble_montage, MontageBuilder, MontageError, MontageOptions};
pub use utils::{
    create_temporary_directory, list_files_sorted, list_frame_files, TaskId, TaskWorkspace,
};

/// Resolve ffmpeg (at `explicit_path` if given, otherwise on the command line) and check that it
/// really is ffmpeg.
pub fn locate_and_validate_tool(
    explicit_path: Option<&std::path::Path>,
) -> Result<std::path::PathBuf, FfmpegError> {
    locate_and_validate_ffmpeg(explicit_path)
}
