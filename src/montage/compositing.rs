use image::{GenericImage, RgbImage};

/// The number of (columns, rows) needed to hold `num_images` in a grid that is as close to
/// square as possible. Rows are filled first, so only the last row may be partially empty.
#[must_use]
pub fn grid_dimensions(num_images: u32) -> (u32, u32) {
    if num_images == 0 {
        return (0, 0);
    }

    let columns = (f64::from(num_images).sqrt().round() as u32).max(1);
    let rows = num_images.div_ceil(columns);
    (columns, rows)
}

/// The size each frame is scaled to so that `columns` frames fit side by side in `target_width`
/// pixels, keeping the aspect ratio of `frame_dimensions`.
#[must_use]
pub fn tile_dimensions(
    target_width: u32,
    columns: u32,
    frame_dimensions: (u32, u32),
) -> (u32, u32) {
    let (frame_x, frame_y) = frame_dimensions;

    let tile_x = (target_width / columns.max(1)).max(1);
    let tile_y = if frame_x == 0 {
        tile_x
    } else {
        ((f64::from(tile_x) * f64::from(frame_y) / f64::from(frame_x)).round() as u32).max(1)
    };

    (tile_x, tile_y)
}

/// Arrange a sequence of images in a grid, `columns` wide, in row-major order.
/// All images must share the same dimensions. The output is `canvas_width` pixels wide (or wider,
/// if the images do not fit), and any unused space is black.
///
/// Returns None if there are no images.
///
/// Panics if the images are not all the same dimensions.
#[must_use]
pub fn grid_images_rgb(images: &[RgbImage], columns: u32, canvas_width: u32) -> Option<RgbImage> {
    //Check that all image dimensions are equal to the dimensions of the first
    //image.
    let mut all_img_dimensions = images.iter().map(RgbImage::dimensions);
    let (img_x, img_y) = all_img_dimensions.next()?;

    assert!(all_img_dimensions
        .all(|(curr_img_x, curr_img_y)| curr_img_x == img_x && curr_img_y == img_y));

    //work out how wide and how deep the output buffer needs to be
    let columns = columns.max(1);
    let num_images = u32::try_from(images.len()).ok()?;
    let rows = num_images.div_ceil(columns);

    //create the output buffer and fill it.
    let mut grid_buf = RgbImage::new(canvas_width.max(columns * img_x), rows * img_y);
    for (img_no, img) in (0..num_images).zip(images) {
        let x_coord = (img_no % columns) * img_x;
        let y_coord = (img_no / columns) * img_y;
        grid_buf
            .copy_from(img, x_coord, y_coord)
            .expect("unreachable due to above assertion about image dimensions");
    }

    Some(grid_buf)
}

#[cfg(test)]
mod test {
    use image::Rgb;

    use super::*;

    #[test]
    fn test_grid_dimensions() {
        assert_eq!(grid_dimensions(0), (0, 0));
        assert_eq!(grid_dimensions(1), (1, 1));
        assert_eq!(grid_dimensions(2), (1, 2));
        assert_eq!(grid_dimensions(3), (2, 2));
        assert_eq!(grid_dimensions(4), (2, 2));
        assert_eq!(grid_dimensions(5), (2, 3));
        assert_eq!(grid_dimensions(7), (3, 3));
        assert_eq!(grid_dimensions(9), (3, 3));
        assert_eq!(grid_dimensions(52), (7, 8));
        assert_eq!(grid_dimensions(100), (10, 10));
    }

    #[test]
    fn test_grid_holds_every_image() {
        for num_images in 1..=200 {
            let (columns, rows) = grid_dimensions(num_images);
            assert!(columns * rows >= num_images);
            assert!(columns * (rows - 1) < num_images, "{num_images}: empty last row");
        }
    }

    #[test]
    fn test_tile_dimensions() {
        assert_eq!(tile_dimensions(720, 3, (144, 144)), (240, 240));
        assert_eq!(tile_dimensions(720, 7, (144, 144)), (102, 102));
        assert_eq!(tile_dimensions(720, 2, (640, 360)), (360, 203));
        assert_eq!(tile_dimensions(5, 10, (144, 144)), (1, 1));
    }

    #[test]
    fn test_grid_images_row_major() {
        let colours = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];
        let images = colours
            .iter()
            .map(|&c| RgbImage::from_pixel(2, 2, Rgb(c)))
            .collect::<Vec<_>>();

        let grid = grid_images_rgb(&images, 2, 5).unwrap();
        assert_eq!(grid.dimensions(), (5, 4));

        assert_eq!(grid.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(grid.get_pixel(2, 0), &Rgb([0, 255, 0]));
        assert_eq!(grid.get_pixel(0, 2), &Rgb([0, 0, 255]));

        //unused space is left black
        assert_eq!(grid.get_pixel(2, 2), &Rgb([0, 0, 0]));
        assert_eq!(grid.get_pixel(4, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_grid_no_images() {
        assert_eq!(grid_images_rgb(&[], 3, 720), None);
    }

    #[test]
    #[should_panic]
    fn test_grid_mismatched_images() {
        let images = [RgbImage::new(2, 2), RgbImage::new(3, 2)];
        let _ = grid_images_rgb(&images, 2, 10);
    }
}
