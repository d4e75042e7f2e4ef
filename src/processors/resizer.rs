// yapt/src/processors/resizer.rs
use image::{imageops::FilterType, DynamicImage};

pub struct Resizer {
    filter: FilterType,
}

impl Resizer {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    /// Scales `image` down until it fits in `bounds`, keeping its aspect ratio.
    /// Images already inside the box are returned unchanged.
    pub fn fit(&self, image: &DynamicImage, bounds: (u32, u32)) -> DynamicImage {
        let (width, height) = fit_dimensions(image.width(), image.height(), bounds);

        if width == image.width() && height == image.height() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return image.clone();
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );

        image.resize_exact(width, height, self.filter)
    }

    /// Rotates counter-clockwise by a multiple of 90 degrees.
    pub fn rotate(&self, image: DynamicImage, degrees: u32) -> DynamicImage {
        match degrees % 360 {
            90 => image.rotate270(),
            180 => image.rotate180(),
            270 => image.rotate90(),
            _ => image,
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(FilterType::Lanczos3)
    }
}

/// Largest size with the original aspect ratio that fits in `bounds`.
pub fn fit_dimensions(orig_w: u32, orig_h: u32, bounds: (u32, u32)) -> (u32, u32) {
    let (max_w, max_h) = bounds;
    if orig_w <= max_w && orig_h <= max_h {
        return (orig_w, orig_h);
    }

    let ratio_w = max_w as f64 / orig_w as f64;
    let ratio_h = max_h as f64 / orig_h as f64;
    let ratio = ratio_w.min(ratio_h);

    let new_w = ((orig_w as f64 * ratio).round() as u32).clamp(1, max_w.max(1));
    let new_h = ((orig_h as f64 * ratio).round() as u32).clamp(1, max_h.max(1));

    (new_w, new_h)
}

/// Counter-clockwise rotation that puts an image with the given EXIF
/// orientation upright. Mirrored orientations share the rotation of their
/// unmirrored counterpart; the flip itself is not undone.
pub fn orientation_rotation(orientation: u32) -> u32 {
    match orientation {
        3 | 4 => 180,
        5 | 6 => 270,
        7 | 8 => 90,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn fits_landscape_into_box() {
        assert_eq!(fit_dimensions(1600, 1200, (800, 600)), (800, 600));
        assert_eq!(fit_dimensions(4000, 1000, (800, 600)), (800, 200));
        assert_eq!(fit_dimensions(1000, 3000, (800, 600)), (200, 600));
    }

    #[test]
    fn small_images_keep_their_size() {
        assert_eq!(fit_dimensions(400, 300, (800, 600)), (400, 300));
        assert_eq!(fit_dimensions(800, 600, (800, 600)), (800, 600));
    }

    #[test]
    fn fit_resizes_pixels() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(1600, 900));
        let out = Resizer::default().fit(&image, (800, 600));
        assert_eq!((out.width(), out.height()), (800, 450));
    }

    #[test]
    fn orientation_mapping_ignores_mirroring() {
        assert_eq!(orientation_rotation(1), 0);
        assert_eq!(orientation_rotation(2), 0);
        assert_eq!(orientation_rotation(3), 180);
        assert_eq!(orientation_rotation(4), 180);
        assert_eq!(orientation_rotation(5), 270);
        assert_eq!(orientation_rotation(6), 270);
        assert_eq!(orientation_rotation(7), 90);
        assert_eq!(orientation_rotation(8), 90);
        assert_eq!(orientation_rotation(42), 0);
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let resizer = Resizer::default();
        let image = DynamicImage::ImageRgb8(RgbImage::new(80, 50));
        let rotated = resizer.rotate(image.clone(), 270);
        assert_eq!((rotated.width(), rotated.height()), (50, 80));
        let rotated = resizer.rotate(image, 180);
        assert_eq!((rotated.width(), rotated.height()), (80, 50));
    }

    #[test]
    fn counter_clockwise_quarter_turn_moves_top_left_to_bottom_left() {
        let mut buffer = RgbImage::new(2, 1);
        buffer.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        let rotated = Resizer::default().rotate(DynamicImage::ImageRgb8(buffer), 90);
        let rgb = rotated.to_rgb8();
        assert_eq!(rgb.dimensions(), (1, 2));
        assert_eq!(rgb.get_pixel(0, 1), &image::Rgb([255, 0, 0]));
    }
}
