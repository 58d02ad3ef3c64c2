use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_cmdline_utils::{locate_and_validate_ffmpeg, FfmpegCommand};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    definitions::{
        DEFAULT_INTERVAL_SECS, DEFAULT_PROBE_FRAME_COUNT, DEFAULT_PROBE_TIMEOUT, FRAME_HEIGHT,
        FRAME_WIDTH,
    },
    frame_extraction::{CropDetector, CropSpec, ExtractionError, FrameFile},
    utils::list_frame_files,
};

/// Whether to remove [black bars](https://en.wikipedia.org/wiki/Letterboxing_(filming)) from
/// around the edges of video frames before they are extracted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Cropdetect {
    /// Do not detect letterboxing
    None,
    /// Detect letterboxes around the edges of videos (top, bottom, left, right)
    Letterbox,
}

/// Options for how frames are extracted from a video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// The sampling interval. It is passed to ffmpeg as the output frame rate (`-r`), so for
    /// whole numbers of seconds ffmpeg writes one frame per step of the output timeline.
    ///
    /// Must be finite and greater than zero.
    pub interval_secs: f64,

    /// Whether to detect and remove letterboxing.
    pub cropdetect: Cropdetect,

    /// The number of frames decoded at each cropdetect probe.
    pub probe_frame_count: u32,

    /// Time allowed for each cropdetect probe. None waits forever.
    pub probe_timeout: Option<Duration>,

    /// Time allowed for the extraction itself. None waits forever, which is the default because
    /// decoding a long film can legitimately take a long time.
    pub extraction_timeout: Option<Duration>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            cropdetect: Cropdetect::Letterbox,
            probe_frame_count: DEFAULT_PROBE_FRAME_COUNT,
            probe_timeout: Some(DEFAULT_PROBE_TIMEOUT),
            extraction_timeout: None,
        }
    }
}

/// Configures and validates a frame extraction. Nothing is decoded until
/// [`FramesExtractor::extract`] is called on the result of [`FramesExtractorBuilder::build`].
#[derive(Debug, Clone)]
pub struct FramesExtractorBuilder {
    video_path: PathBuf,
    output_dir: PathBuf,
    duration_secs: f64,
    tool_path: Option<PathBuf>,
    options: ExtractionOptions,
}

impl FramesExtractorBuilder {
    /// `duration_secs` is the length of the video. It is not measured here; it bounds how far into
    /// the video crop detection looks.
    pub fn new(
        video_path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        duration_secs: f64,
    ) -> Self {
        Self {
            video_path: video_path.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            duration_secs,
            tool_path: None,
            options: ExtractionOptions::default(),
        }
    }

    pub fn interval_secs(&mut self, interval_secs: f64) -> &mut Self {
        self.options.interval_secs = interval_secs;
        self
    }

    /// Use the ffmpeg at this location instead of searching for it on the command line.
    pub fn tool_path(&mut self, tool_path: impl AsRef<Path>) -> &mut Self {
        self.tool_path = Some(tool_path.as_ref().to_path_buf());
        self
    }

    pub fn options(&mut self, options: ExtractionOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Check every precondition of the extraction, in this order:
    /// 1. The video exists
    /// 2. The output directory exists
    /// 3. The sampling interval is valid
    /// 4. ffmpeg can be found and really is ffmpeg (this runs `ffmpeg -version`)
    pub fn build(&self) -> Result<FramesExtractor, ExtractionError> {
        if !self.video_path.exists() {
            return Err(ExtractionError::VideoNotFound(self.video_path.clone()));
        }

        if !self.output_dir.is_dir() {
            return Err(ExtractionError::OutputDirectoryNotFound(self.output_dir.clone()));
        }

        let interval_secs = self.options.interval_secs;
        if !interval_secs.is_finite() || interval_secs <= 0.0 {
            return Err(ExtractionError::InvalidInterval(interval_secs));
        }

        let tool_path = locate_and_validate_ffmpeg(self.tool_path.as_deref())?;

        Ok(FramesExtractor {
            video_path: self.video_path.clone(),
            output_dir: self.output_dir.clone(),
            duration_secs: self.duration_secs,
            tool_path,
            options: self.options,
        })
    }
}

/// A validated frame extraction, ready to run.
#[derive(Debug, Clone)]
pub struct FramesExtractor {
    video_path: PathBuf,
    output_dir: PathBuf,
    duration_secs: f64,
    tool_path: PathBuf,
    options: ExtractionOptions,
}

impl FramesExtractor {
    pub fn tool_path(&self) -> &Path {
        &self.tool_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Detect the crop to apply to this video, according to the configured [`Cropdetect`].
    pub fn detect_crop(&self) -> CropSpec {
        match self.options.cropdetect {
            Cropdetect::None => CropSpec::None,
            Cropdetect::Letterbox => CropDetector::new(&self.tool_path)
                .probe_frame_count(self.options.probe_frame_count)
                .probe_timeout(self.options.probe_timeout)
                .detect(&self.video_path, self.duration_secs),
        }
    }

    /// The ffmpeg command that writes the frames, cropped by `crop`, into the output directory.
    pub fn extraction_command(&self, crop: &CropSpec) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(&self.tool_path);

        cmd.args(["-hide_banner", "-nostdin", "-nostats"])
            .arg("-i")
            .arg(&self.video_path)
            .args(crop.as_ffmpeg_args())
            .arg("-s")
            .arg(format!("{FRAME_WIDTH}x{FRAME_HEIGHT}"))
            .arg("-r")
            .arg(self.options.interval_secs.to_string())
            .arg(self.output_dir.join(FrameFile::ffmpeg_output_pattern()))
            .timeout(self.options.extraction_timeout);

        cmd
    }

    /// Detect the crop, then extract the frames.
    ///
    /// Returns the extracted frames in sequence order.
    ///
    /// # Errors
    /// * [`ExtractionError::NoFramesExtracted`] if ffmpeg ran but did not produce any frames
    /// * [`ExtractionError::Ffmpeg`] if ffmpeg could not be run to completion
    pub fn extract(&self) -> Result<Vec<FrameFile>, ExtractionError> {
        let crop = self.detect_crop();
        self.extract_with_crop(&crop)
    }

    /// Extract the frames using a crop that has already been worked out.
    pub fn extract_with_crop(&self, crop: &CropSpec) -> Result<Vec<FrameFile>, ExtractionError> {
        let cmd = self.extraction_command(crop);

        let output = cmd.run().map_err(|error| ExtractionError::Ffmpeg {
            command: cmd.command_line(),
            error,
        })?;

        if !output.success() {
            warn!(
                "ffmpeg exited with {} while extracting frames from {}",
                output.status(),
                self.video_path.display()
            );
        }

        let frames = list_frame_files(&self.output_dir).map_err(|e| ExtractionError::Io {
            path: self.output_dir.clone(),
            error: e.to_string(),
        })?;

        if frames.is_empty() {
            return Err(ExtractionError::NoFramesExtracted {
                command: cmd.command_line(),
                output: output.diagnostic_text(),
            });
        }

        info!(
            "Extracted {} frames from {} into {}",
            frames.len(),
            self.video_path.display(),
            self.output_dir.display()
        );
        Ok(frames)
    }
}

/// Extract one frame per `interval_secs` from the video at `video_path` into `output_dir`,
/// removing any letterboxing.
///
/// If `tool_path` is None then ffmpeg is searched for on the command line.
pub fn extract_frames(
    video_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    duration_secs: f64,
    interval_secs: f64,
    tool_path: Option<&Path>,
) -> Result<Vec<FrameFile>, ExtractionError> {
    let mut builder = FramesExtractorBuilder::new(video_path, output_dir, duration_secs);
    builder.interval_secs(interval_secs);
    if let Some(tool_path) = tool_path {
        builder.tool_path(tool_path);
    }

    builder.build()?.extract()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame_extraction::CropRegion;

    fn extractor(interval_secs: f64) -> FramesExtractor {
        FramesExtractor {
            video_path: PathBuf::from("/videos/rocket.mkv"),
            output_dir: PathBuf::from("/tmp/frames"),
            duration_secs: 52.3,
            tool_path: PathBuf::from("/usr/bin/ffmpeg"),
            options: ExtractionOptions {
                interval_secs,
                ..ExtractionOptions::default()
            },
        }
    }

    fn args_of(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.get_args()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_extraction_command_without_crop() {
        let cmd = extractor(1.0).extraction_command(&CropSpec::None);

        #[rustfmt::skip]
        let exp = [
            "-hide_banner", "-nostdin", "-nostats",
            "-i", "/videos/rocket.mkv",
            "-s", "144x144",
            "-r", "1",
            "/tmp/frames/video_frame_%07d.jpeg",
        ];
        assert_eq!(args_of(&cmd), exp);
        assert_eq!(cmd.program(), Path::new("/usr/bin/ffmpeg"));
    }

    #[test]
    fn test_extraction_command_with_crop() {
        let crop = CropSpec::Crop(CropRegion {
            width: 640,
            height: 352,
            x: 0,
            y: 64,
        });
        let cmd = extractor(0.5).extraction_command(&crop);

        #[rustfmt::skip]
        let exp = [
            "-hide_banner", "-nostdin", "-nostats",
            "-i", "/videos/rocket.mkv",
            "-vf", "crop=640:352:0:64",
            "-s", "144x144",
            "-r", "0.5",
            "/tmp/frames/video_frame_%07d.jpeg",
        ];
        assert_eq!(args_of(&cmd), exp);
    }

    #[test]
    fn test_cropdetect_disabled() {
        let mut extractor = extractor(1.0);
        extractor.options.cropdetect = Cropdetect::None;

        assert_eq!(extractor.detect_crop(), CropSpec::None);
    }

    #[test]
    fn test_missing_video_checked_first() {
        let result = FramesExtractorBuilder::new("/no/such/video.mkv", "/no/such/dir", 10.0)
            .interval_secs(-1.0)
            .tool_path("/no/such/ffmpeg")
            .build();

        assert_eq!(
            result.unwrap_err(),
            ExtractionError::VideoNotFound(PathBuf::from("/no/such/video.mkv"))
        );
    }

    #[test]
    fn test_missing_output_dir_checked_before_tool() {
        let video = tempfile::NamedTempFile::new().unwrap();
        let result = FramesExtractorBuilder::new(video.path(), "/no/such/dir", 10.0)
            .tool_path("/no/such/ffmpeg")
            .build();

        assert_eq!(
            result.unwrap_err(),
            ExtractionError::OutputDirectoryNotFound(PathBuf::from("/no/such/dir"))
        );
    }

    #[test]
    fn test_invalid_interval() {
        let video = tempfile::NamedTempFile::new().unwrap();
        let output_dir = tempfile::tempdir().unwrap();

        for interval in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = FramesExtractorBuilder::new(video.path(), output_dir.path(), 10.0)
                .interval_secs(interval)
                .tool_path("/no/such/ffmpeg")
                .build();

            assert!(
                matches!(result, Err(ExtractionError::InvalidInterval(_))),
                "{interval}"
            );
        }
    }

    #[test]
    fn test_missing_tool() {
        let video = tempfile::NamedTempFile::new().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let result = FramesExtractorBuilder::new(video.path(), output_dir.path(), 10.0)
            .tool_path(output_dir.path().join("ffmpeg"))
            .build();

        assert!(matches!(result, Err(ExtractionError::ToolNotFound(_))));
    }
}
