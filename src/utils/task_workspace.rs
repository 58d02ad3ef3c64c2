use std::{
    fmt,
    io,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

use crate::definitions::{TASK_ID_LEN, WORKSPACE_DIR_NAME};

/// A random identifier used to keep the temporary files of one task apart from those of every
/// other task running in the same process or on the same machine.
///
/// It is drawn from the operating system's random source, but it is only a namespace and carries
/// no security meaning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        let id = OsRng
            .sample_iter(&Alphanumeric)
            .take(TASK_ID_LEN)
            .map(char::from)
            .collect::<String>();

        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A private directory tree for a single task:
///
/// ```text
/// <base>/videohash_frames/<task id>/frames/   extracted frames
/// <base>/videohash_frames/<task id>/montage/  the assembled montage
/// ```
#[derive(Debug)]
pub struct TaskWorkspace {
    task_id: TaskId,
    root: PathBuf,
}

impl TaskWorkspace {
    /// Create a workspace under `base`, or under the system temp directory if `base` is None.
    pub fn create(base: Option<&Path>) -> io::Result<Self> {
        let base = base.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let task_id = TaskId::generate();
        let root = base.join(WORKSPACE_DIR_NAME).join(task_id.as_str());

        let ret = Self { task_id, root };
        std::fs::create_dir_all(ret.frames_dir())?;
        std::fs::create_dir_all(ret.montage_dir())?;

        debug!("Created task workspace at {}", ret.root.display());
        Ok(ret)
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    pub fn montage_dir(&self) -> PathBuf {
        self.root.join("montage")
    }

    pub fn montage_path(&self) -> PathBuf {
        self.montage_dir().join("montage.jpeg")
    }

    /// Delete the workspace and everything in it.
    pub fn remove(self) -> io::Result<()> {
        std::fs::remove_dir_all(&self.root).map_err(|e| {
            warn!("Failed to remove task workspace {}: {e}", self.root.display());
            e
        })
    }
}

/// Create a new, empty directory inside the system temp directory and return its path.
pub fn create_temporary_directory() -> io::Result<PathBuf> {
    let path = std::env::temp_dir()
        .join(WORKSPACE_DIR_NAME)
        .join(TaskId::generate().as_str())
        .join("temp_storage_dir");

    std::fs::create_dir_all(&path)?;
    Ok(path)
}
