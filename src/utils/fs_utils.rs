use std::{
    io,
    path::{Path, PathBuf},
};

use crate::frame_extraction::FrameFile;

/// Every file (not directory) directly inside `dir`, sorted by path.
pub fn list_files_sorted(dir: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let mut ret = vec![];
    for entry in std::fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            ret.push(entry.path());
        }
    }

    ret.sort();
    Ok(ret)
}

/// Every extracted frame directly inside `dir`, in sequence order. Files that are not frames
/// are ignored.
pub fn list_frame_files(dir: impl AsRef<Path>) -> io::Result<Vec<FrameFile>> {
    let mut frames = list_files_sorted(dir)?
        .into_iter()
        .filter_map(FrameFile::from_path)
        .collect::<Vec<_>>();

    frames.sort();
    Ok(frames)
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    #[test]
    fn test_list_files_sorted_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "c.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        fs::create_dir(dir.path().join("0_subdir")).unwrap();

        let act = list_files_sorted(dir.path()).unwrap();
        let exp = ["a.txt", "b.txt", "c.txt"].map(|name| dir.path().join(name));

        assert_eq!(act, exp);
    }

    #[test]
    fn test_list_frame_files() {
        let dir = tempfile::tempdir().unwrap();
        for index in [3, 1, 2] {
            fs::write(dir.path().join(FrameFile::file_name(index)), b"").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let indices = list_frame_files(dir.path())
            .unwrap()
            .iter()
            .map(FrameFile::index)
            .collect::<Vec<_>>();

        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files_sorted(dir.path().join("missing")).is_err());
    }
}
