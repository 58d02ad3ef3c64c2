use std::path::{Path, PathBuf};

use image::{imageops::FilterType, RgbImage};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    definitions::DEFAULT_MONTAGE_WIDTH,
    montage::{grid_dimensions, grid_images_rgb, tile_dimensions, MontageError},
};

/// Options for how a montage is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MontageOptions {
    /// Width of the finished montage.
    ///
    /// Unit: Pixels
    pub target_width: u32,
}

impl Default for MontageOptions {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_MONTAGE_WIDTH,
        }
    }
}

/// Assembles frames into a single image, laid out in a grid that is as close to square as
/// possible.
#[derive(Debug, Clone, Default)]
pub struct MontageBuilder {
    options: MontageOptions,
}

impl MontageBuilder {
    pub fn from_options(options: MontageOptions) -> Self {
        Self { options }
    }

    /// Compose the images at `image_paths` (in order, left to right then top to bottom) and write
    /// the result to `output_path`. The encoding is chosen from the extension of `output_path`.
    ///
    /// Every frame is scaled to the same tile size. The tile width is the target width divided
    /// evenly between the columns and the tile height keeps the aspect ratio of the first frame.
    ///
    /// # Errors
    /// * [`MontageError::EmptyFrameSet`] if `image_paths` is empty
    /// * [`MontageError::DestinationNotFound`] if the directory containing `output_path` is missing
    /// * [`MontageError::ImageRead`] if a frame cannot be decoded
    /// * [`MontageError::ImageWrite`] if the montage cannot be encoded or saved
    pub fn assemble<P: AsRef<Path>>(
        &self,
        image_paths: &[P],
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf, MontageError> {
        let output_path = output_path.as_ref();

        if image_paths.is_empty() {
            return Err(MontageError::EmptyFrameSet);
        }

        let destination_dir = match output_path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
            Some(dir) => dir,
            None => output_path,
        };
        if !destination_dir.is_dir() {
            return Err(MontageError::DestinationNotFound(destination_dir.to_path_buf()));
        }

        let frames = image_paths
            .iter()
            .map(|path| read_rgb(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let montage = self.compose(&frames).ok_or(MontageError::EmptyFrameSet)?;

        montage.save(output_path).map_err(|e| MontageError::ImageWrite {
            path: output_path.to_path_buf(),
            error: e.to_string(),
        })?;

        info!(
            "Wrote {}x{} montage of {} frames to {}",
            montage.width(),
            montage.height(),
            frames.len(),
            output_path.display()
        );
        Ok(output_path.to_path_buf())
    }

    /// Scale the frames to the tile size and lay them out. Returns None if there are no frames.
    pub fn compose(&self, frames: &[RgbImage]) -> Option<RgbImage> {
        let num_frames = u32::try_from(frames.len()).ok()?;
        let first_dimensions = frames.first()?.dimensions();

        let (columns, rows) = grid_dimensions(num_frames);
        let (tile_x, tile_y) =
            tile_dimensions(self.options.target_width, columns, first_dimensions);
        debug!("Montage grid: {columns}x{rows}, tiles: {tile_x}x{tile_y}");

        let tiles = frames
            .iter()
            .map(|frame| {
                if frame.dimensions() == (tile_x, tile_y) {
                    frame.clone()
                } else {
                    image::imageops::resize(frame, tile_x, tile_y, FilterType::Triangle)
                }
            })
            .collect::<Vec<_>>();

        grid_images_rgb(&tiles, columns, self.options.target_width)
    }
}

fn read_rgb(path: &Path) -> Result<RgbImage, MontageError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|e| MontageError::ImageRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// Compose the images at `image_paths` into a montage `target_width` pixels wide, written to
/// `output_path`. See [`MontageBuilder::assemble`].
pub fn assemble_montage<P: AsRef<Path>>(
    image_paths: &[P],
    output_path: impl AsRef<Path>,
    target_width: u32,
) -> Result<PathBuf, MontageError> {
    MontageBuilder::from_options(MontageOptions { target_width }).assemble(image_paths, output_path)
}

#[cfg(test)]
mod test {
    use image::Rgb;

    use super::*;

    #[test]
    fn test_compose_fills_target_width() {
        let frames = vec![RgbImage::from_pixel(240, 240, Rgb([10, 20, 30])); 9];
        let montage = MontageBuilder::default().compose(&frames).unwrap();

        assert_eq!(montage.dimensions(), (720, 720));
        assert_eq!(montage.get_pixel(719, 719), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_compose_keeps_aspect_ratio() {
        let frames = vec![RgbImage::new(320, 180); 4];
        let montage = MontageBuilder::from_options(MontageOptions { target_width: 640 })
            .compose(&frames)
            .unwrap();

        assert_eq!(montage.dimensions(), (640, 360));
    }

    #[test]
    fn test_compose_nothing() {
        assert_eq!(MontageBuilder::default().compose(&[]), None);
    }

    #[test]
    fn test_empty_frame_set_checked_first() {
        let paths: [&str; 0] = [];
        let result = assemble_montage(&paths, "/no/such/dir/montage.jpeg", 720);

        assert_eq!(result, Err(MontageError::EmptyFrameSet));
    }
}
