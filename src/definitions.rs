use std::time::Duration;

/// The times (in seconds from the start of the video) at which ffmpeg's cropdetect filter is
/// sampled. Only the times that fall within the duration of the video are used, so short videos are
/// probed only a few times and feature length videos are probed up to four hours in.
pub const CROPDETECT_PROBE_TIMES: [u32; 12] =
    [2, 5, 10, 20, 40, 100, 300, 600, 1200, 2400, 7200, 14400];

/// The default number of frames decoded at each cropdetect probe time.
pub const DEFAULT_PROBE_FRAME_COUNT: u32 = 3;

/// The default time to allow for each cropdetect probe before ffmpeg is killed. Decoding a
/// handful of frames rarely takes more than a second, even after a long seek.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Each extracted frame is scaled to this size, regardless of the aspect ratio of the video.
///
/// Unit: Pixels
pub const FRAME_WIDTH: u32 = 144;
pub const FRAME_HEIGHT: u32 = 144;

/// The default sampling interval. This value is passed to ffmpeg as the output frame rate.
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;

//Extracted frames are named video_frame_0000001.jpeg, video_frame_0000002.jpeg...
pub const FRAME_FILE_PREFIX: &str = "video_frame_";
pub const FRAME_FILE_EXTENSION: &str = "jpeg";
pub const FRAME_INDEX_DIGITS: usize = 7;

/// The default width of an assembled montage.
///
/// Unit: Pixels
pub const DEFAULT_MONTAGE_WIDTH: u32 = 720;

/// Length of the random identifier used to keep the temporary files of separate tasks apart.
pub const TASK_ID_LEN: usize = 20;

//Name of the directory (inside the system temp dir, unless told otherwise) holding all task
//workspaces.
pub const WORKSPACE_DIR_NAME: &str = "videohash_frames";
