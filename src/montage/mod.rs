pub mod compositing;
pub mod montage_builder;
pub mod montage_error_kind;

pub use compositing::{grid_dimensions, grid_images_rgb, tile_dimensions};
pub use montage_builder::{assemble_montage, MontageBuilder, MontageOptions};
pub use montage_error_kind::MontageError;
