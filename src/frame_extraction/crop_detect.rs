use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use ffmpeg_cmdline_utils::FfmpegCommand;
use lazy_static::lazy_static;
use log::{debug, info, trace, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::definitions::{CROPDETECT_PROBE_TIMES, DEFAULT_PROBE_FRAME_COUNT, DEFAULT_PROBE_TIMEOUT};

lazy_static! {
    //width and height never have a leading zero. Offsets may be zero.
    static ref CROP_RE: Regex =
        Regex::new(r"crop=[1-9][0-9]{0,3}:[1-9][0-9]{0,3}:[0-9]{1,4}:[0-9]{1,4}")
            .expect("crop regex is valid");
}

/// A rectangle within a video frame, in the form understood by ffmpeg's crop filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRegion {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRegion {
    /// The value for ffmpeg's `-vf` argument, e.g. `crop=640:352:0:64`.
    pub fn filter_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Not a crop filter: '{0}'")]
pub struct CropParseError(String);

impl FromStr for CropRegion {
    type Err = CropParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CropParseError(s.to_string());

        let fields = s
            .strip_prefix("crop=")
            .ok_or_else(err)?
            .split(':')
            .map(|field| field.parse::<u32>().map_err(|_| err()))
            .collect::<Result<Vec<_>, _>>()?;

        match fields[..] {
            [width, height, x, y] if width > 0 && height > 0 => Ok(Self {
                width,
                height,
                x,
                y,
            }),
            _ => Err(err()),
        }
    }
}

/// The outcome of crop detection: either no crop at all or a single region to crop to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropSpec {
    #[default]
    None,
    Crop(CropRegion),
}

impl CropSpec {
    pub fn region(&self) -> Option<CropRegion> {
        match self {
            Self::None => None,
            Self::Crop(region) => Some(*region),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The arguments to add to an ffmpeg command to apply this crop.
    pub fn as_ffmpeg_args(&self) -> Vec<String> {
        match self {
            Self::None => vec![],
            Self::Crop(region) => vec!["-vf".to_string(), region.filter_arg()],
        }
    }
}

impl From<Option<CropRegion>> for CropSpec {
    fn from(region: Option<CropRegion>) -> Self {
        region.map_or(Self::None, Self::Crop)
    }
}

/// Finds all the `crop=W:H:X:Y` values printed by ffmpeg's cropdetect filter, in the order they
/// appear.
pub fn find_crop_candidates(diagnostic_text: &str) -> Vec<&str> {
    CROP_RE
        .find_iter(diagnostic_text)
        .map(|m| m.as_str())
        .collect()
}

/// The most frequent value in `candidates`. When several values are equally frequent, the one
/// that appears first wins. Returns None if there are no candidates.
pub fn select_mode<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &candidate in candidates {
        *counts.entry(candidate).or_insert(0) += 1;
    }

    //scan in the original order and only replace the best value when strictly beaten.
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let count = counts[candidate];
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((candidate, count)),
        }
    }

    best.map(|(candidate, _count)| candidate)
}

/// Detects [black bars](https://en.wikipedia.org/wiki/Letterboxing_(filming)) around the edges of
/// a video by running ffmpeg's cropdetect filter at several points in the video and choosing the
/// most commonly reported crop.
#[derive(Clone, Debug)]
pub struct CropDetector {
    tool_path: PathBuf,
    probe_frame_count: u32,
    probe_timeout: Option<Duration>,
}

impl CropDetector {
    /// `tool_path` should already have been validated by
    /// [`ffmpeg_cmdline_utils::locate_and_validate_ffmpeg`].
    pub fn new(tool_path: impl AsRef<Path>) -> Self {
        Self {
            tool_path: tool_path.as_ref().to_path_buf(),
            probe_frame_count: DEFAULT_PROBE_FRAME_COUNT,
            probe_timeout: Some(DEFAULT_PROBE_TIMEOUT),
        }
    }

    /// Number of frames decoded at each probe time.
    pub fn probe_frame_count(&mut self, probe_frame_count: u32) -> &mut Self {
        self.probe_frame_count = probe_frame_count;
        self
    }

    pub fn probe_timeout(&mut self, probe_timeout: Option<Duration>) -> &mut Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// The probe times that will be used for a video of the given duration.
    pub fn probe_times(duration_secs: f64) -> impl Iterator<Item = u32> {
        let limit = duration_secs.ceil();
        CROPDETECT_PROBE_TIMES
            .into_iter()
            .take_while(move |&start| f64::from(start) <= limit)
    }

    /// The ffmpeg command which runs cropdetect on a few frames starting at `start_secs`,
    /// discarding the decoded frames.
    pub fn probe_command(&self, video_path: &Path, start_secs: u32) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(&self.tool_path);

        cmd.args(["-hide_banner", "-nostdin", "-nostats"])
            .arg("-ss")
            .arg(start_secs.to_string())
            .arg("-i")
            .arg(video_path)
            .arg("-vframes")
            .arg(self.probe_frame_count.to_string())
            .args(["-vf", "cropdetect"])
            .args(["-f", "null", "-"])
            .timeout(self.probe_timeout);

        cmd
    }

    /// Work out how to crop the video at `video_path`.
    ///
    /// This never fails. If ffmpeg cannot be run, or reports nothing, then no crop is applied.
    pub fn detect(&self, video_path: impl AsRef<Path>, duration_secs: f64) -> CropSpec {
        let video_path = video_path.as_ref();

        let mut diagnostics = vec![];
        for start_secs in Self::probe_times(duration_secs) {
            let cmd = self.probe_command(video_path, start_secs);
            match cmd.run() {
                Ok(output) => {
                    let text = output.combined_lossy();
                    trace!("cropdetect at {start_secs}s printed {} bytes", text.len());
                    diagnostics.push(text);
                }
                Err(e) => warn!(
                    "cropdetect at {start_secs}s failed for {}: {e}",
                    video_path.display()
                ),
            }
        }

        let candidates = diagnostics
            .iter()
            .flat_map(|text| find_crop_candidates(text))
            .collect::<Vec<_>>();
        debug!("{} crop candidates for {}", candidates.len(), video_path.display());

        let spec: CropSpec = select_mode(&candidates)
            .and_then(|mode| mode.parse::<CropRegion>().ok())
            .into();

        match spec {
            CropSpec::Crop(region) => info!("Detected {region} for {}", video_path.display()),
            CropSpec::None => info!("No crop detected for {}", video_path.display()),
        }

        spec
    }
}

/// Run crop detection on `video_path` with the ffmpeg at `tool_path`.
/// See [`CropDetector::detect`].
pub fn detect_crop(
    video_path: impl AsRef<Path>,
    tool_path: impl AsRef<Path>,
    duration_secs: f64,
    probe_frame_count: u32,
) -> CropSpec {
    CropDetector::new(tool_path)
        .probe_frame_count(probe_frame_count)
        .detect(video_path, duration_secs)
}
