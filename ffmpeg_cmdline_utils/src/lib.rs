//! A thin wrapper around the command line interface to ffmpeg.
//!
//! * [`locate_and_validate_ffmpeg`] finds the ffmpeg executable (either at an explicit location or on
//!   the command line) and checks that it really is ffmpeg.
//! * [`FfmpegCommand`] runs ffmpeg with an argument vector, capturing everything it prints,
//!   optionally killing it if it runs for too long.
//!
//! ffmpeg must be installed separately, for example:
//!
//! * Debian-based systems: ```# apt-get install ffmpeg```
//! * Yum-based systems: ```# yum install ffmpeg```
//! * Windows: download a build from <https://ffmpeg.org/download.html> and add its directory to PATH

mod ffmpeg_error_kind;
mod ffmpeg_ops;
mod tool_locator;

pub use ffmpeg_error_kind::*;
pub use ffmpeg_ops::*;
pub use tool_locator::*;
