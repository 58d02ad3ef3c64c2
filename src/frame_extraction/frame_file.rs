use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::definitions::{FRAME_FILE_EXTENSION, FRAME_FILE_PREFIX, FRAME_INDEX_DIGITS};

/// A single frame written by ffmpeg during extraction.
///
/// Frames are ordered by their sequence index, which is not necessarily the order in which a
/// directory listing returns them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameFile {
    index: u32,
    path: PathBuf,
}

impl FrameFile {
    /// Recognize a path as an extracted frame. Returns None if the file name does not follow
    /// the `video_frame_<7 digits>.jpeg` pattern or if the index is zero.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let file_name = path.file_name()?.to_str()?;

        let index_str = file_name
            .strip_prefix(FRAME_FILE_PREFIX)?
            .strip_suffix(FRAME_FILE_EXTENSION)?
            .strip_suffix('.')?;

        if index_str.len() != FRAME_INDEX_DIGITS || !index_str.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let index = index_str.parse::<u32>().ok().filter(|&index| index > 0)?;

        Some(Self {
            index,
            path: path.to_path_buf(),
        })
    }

    /// The file name of the frame with the given sequence index.
    pub fn file_name(index: u32) -> String {
        format!(
            "{FRAME_FILE_PREFIX}{index:0width$}.{FRAME_FILE_EXTENSION}",
            width = FRAME_INDEX_DIGITS
        )
    }

    /// The pattern handed to ffmpeg so that it numbers its output frames from 1.
    pub fn ffmpeg_output_pattern() -> String {
        format!("{FRAME_FILE_PREFIX}%0{FRAME_INDEX_DIGITS}d.{FRAME_FILE_EXTENSION}")
    }

    /// 1-based sequence index of this frame.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Ord for FrameFile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for FrameFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsRef<Path> for FrameFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(FrameFile::file_name(1), "video_frame_0000001.jpeg");
        assert_eq!(FrameFile::file_name(1234567), "video_frame_1234567.jpeg");
        assert_eq!(FrameFile::ffmpeg_output_pattern(), "video_frame_%07d.jpeg");
    }

    #[test]
    fn test_from_path() {
        let frame = FrameFile::from_path("/tmp/frames/video_frame_0000042.jpeg").unwrap();
        assert_eq!(frame.index(), 42);
        assert_eq!(frame.path(), Path::new("/tmp/frames/video_frame_0000042.jpeg"));
    }

    #[test]
    fn test_from_path_rejects_other_files() {
        for name in [
            "video_frame_0000000.jpeg",
            "video_frame_000001.jpeg",
            "video_frame_00000001.jpeg",
            "video_frame_000000a.jpeg",
            "video_frame_0000001.jpg",
            "video_frame_0000001jpeg",
            "frame_0000001.jpeg",
            "collage.jpeg",
        ] {
            assert_eq!(FrameFile::from_path(name), None, "{name}");
        }
    }

    #[test]
    fn test_orders_numerically() {
        let names = [
            "video_frame_0000010.jpeg",
            "video_frame_0000002.jpeg",
            "video_frame_0000001.jpeg",
        ];
        let mut frames = names
            .iter()
            .filter_map(FrameFile::from_path)
            .collect::<Vec<_>>();
        frames.sort();

        let indices = frames.iter().map(FrameFile::index).collect::<Vec<_>>();
        assert_eq!(indices, vec![1, 2, 10]);
    }
}
