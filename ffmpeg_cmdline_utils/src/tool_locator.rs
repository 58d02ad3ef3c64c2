use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, info};
use FfmpegError::*;

use crate::*;

/// The text that every ffmpeg build prints at the start of `ffmpeg -version`.
pub const FFMPEG_VERSION_BANNER: &str = "ffmpeg version";

const FFMPEG_PROGRAM_NAME: &str = "ffmpeg";

//`ffmpeg -version` returns immediately. Anything slower than this is not ffmpeg.
const VERSION_QUERY_TIMEOUT_SECS: u64 = 60;

/// Find ffmpeg and check that it really is ffmpeg.
///
/// If `explicit_path` is given it is used in preference to searching the command line. An explicit
/// path which is just a bare program name (e.g. `ffmpeg6`) is itself searched for on the command line.
///
/// # Errors
/// * [`FfmpegError::ToolNotFound`] if no executable could be found
/// * [`FfmpegError::ToolInvalid`] if the executable does not identify itself as ffmpeg
pub fn locate_and_validate_ffmpeg(explicit_path: Option<&Path>) -> Result<PathBuf, FfmpegError> {
    let tool_path = locate_ffmpeg(explicit_path)?;
    validate_ffmpeg(&tool_path)?;

    info!("Using ffmpeg at {}", tool_path.display());
    Ok(tool_path)
}

/// Resolve the location of ffmpeg without running it.
pub fn locate_ffmpeg(explicit_path: Option<&Path>) -> Result<PathBuf, FfmpegError> {
    let search_path = std::env::var_os("PATH").unwrap_or_default();

    match explicit_path {
        None => find_in_search_path(OsStr::new(FFMPEG_PROGRAM_NAME), &search_path)
            .ok_or(ToolNotFound { path: None }),

        Some(path) if is_bare_program_name(path) && !is_executable(path) => {
            find_in_search_path(path.as_os_str(), &search_path).ok_or_else(|| ToolNotFound {
                path: Some(path.to_path_buf()),
            })
        }

        Some(path) => {
            if is_executable(path) {
                Ok(path.to_path_buf())
            } else {
                Err(ToolNotFound {
                    path: Some(path.to_path_buf()),
                })
            }
        }
    }
}

/// Run `<tool_path> -version` and check that the output contains the ffmpeg banner.
///
/// Any failure to run the program, other than it not existing, is reported as
/// [`FfmpegError::ToolInvalid`].
pub fn validate_ffmpeg(tool_path: &Path) -> Result<(), FfmpegError> {
    let output = FfmpegCommand::new(tool_path)
        .arg("-version")
        .timeout(Some(Duration::from_secs(VERSION_QUERY_TIMEOUT_SECS)))
        .run()
        .map_err(|e| match e {
            ToolNotFound { .. } => e,
            //the file exists but cannot be run as ffmpeg (exec format error, permission denied at
            //spawn), or it hangs on -version.
            Io(error) => ToolInvalid {
                path: tool_path.to_path_buf(),
                output: error,
            },
            Timeout { command, timeout } => ToolInvalid {
                path: tool_path.to_path_buf(),
                output: format!("'{command}' did not finish within {timeout:?}"),
            },
            ToolInvalid { .. } => e,
        })?;

    let text = output.combined_lossy();
    if !text.contains(FFMPEG_VERSION_BANNER) {
        return Err(ToolInvalid {
            path: tool_path.to_path_buf(),
            output: truncate_diagnostic(&text),
        });
    }

    if let Some(first_line) = text.lines().next() {
        debug!("{first_line}");
    }

    Ok(())
}

/// Look for `program` in each directory of `search_path` (which has the same syntax as the PATH
/// environment variable). On windows the `.exe` suffix is added when missing.
pub fn find_in_search_path(program: &OsStr, search_path: &OsStr) -> Option<PathBuf> {
    let mut file_names = vec![program.to_os_string()];
    if !std::env::consts::EXE_SUFFIX.is_empty()
        && Path::new(program).extension().is_none()
    {
        let mut with_suffix = program.to_os_string();
        with_suffix.push(std::env::consts::EXE_SUFFIX);
        file_names.push(with_suffix);
    }

    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| file_names.iter().map(move |name| dir.join(name)))
        .find(|candidate| is_executable(candidate))
}

fn is_bare_program_name(path: &Path) -> bool {
    path.components().count() == 1 && path.parent() == Some(Path::new(""))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
