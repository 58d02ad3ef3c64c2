mod fs_utils;
mod task_workspace;

pub use fs_utils::{list_files_sorted, list_frame_files};
pub use task_workspace::{create_temporary_directory, TaskId, TaskWorkspace};
