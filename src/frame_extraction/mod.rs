pub mod crop_detect;
pub mod extraction_error_kind;
pub mod frame_file;
pub mod frames_extractor;

pub use crop_detect::{
    detect_crop, find_crop_candidates, select_mode, CropDetector, CropParseError, CropRegion,
    CropSpec,
};
pub use extraction_error_kind::ExtractionError;
pub use frame_file::FrameFile;
pub use frames_extractor::{
    extract_frames, Cropdetect, ExtractionOptions, FramesExtractor, FramesExtractorBuilder,
};
