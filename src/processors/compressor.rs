// yapt/src/processors/compressor.rs
use crate::core::{Result, YaptError};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, ImageFormat};
use oxipng::{optimize_from_memory, Options};
use std::io::Cursor;
use std::path::Path;

/// Re-encodes images without giving up pixel data where the format allows it.
pub struct Compressor {
    quality: u8,
}

impl Compressor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Encodes fully in memory first, so a failed encode never leaves a
    /// truncated file at `path`.
    pub fn save_with_format(
        &self,
        image: &DynamicImage,
        path: &Path,
        format: ImageFormat,
    ) -> Result<()> {
        log::debug!(
            "Saving image to {} with format {:?}, quality: {}",
            path.display(),
            format,
            self.quality
        );

        let data = self.compress_to_bytes(image, format)?;
        std::fs::write(path, data)?;
        self.log_save_result(path)
    }

    pub fn compress_to_bytes(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());

        match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
                match image.color() {
                    ColorType::L8 | ColorType::Rgb8 => image.write_with_encoder(encoder)?,
                    _ => DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?,
                }
            }
            ImageFormat::Png => {
                image.write_to(&mut buffer, ImageFormat::Png)?;
                return self.optimize_png_bytes(&buffer.into_inner());
            }
            ImageFormat::WebP => {
                let encoder = WebPEncoder::new_lossless(&mut buffer);
                if image.color().has_alpha() {
                    DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(encoder)?;
                } else {
                    DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
                }
            }
            ImageFormat::Gif => {
                DynamicImage::ImageRgba8(image.to_rgba8()).write_to(&mut buffer, format)?;
            }
            _ => {
                image.write_to(&mut buffer, format)?;
            }
        }

        Ok(buffer.into_inner())
    }

    fn optimize_png_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        optimize_from_memory(data, &Options::default()).map_err(|e| YaptError::Png(e.to_string()))
    }

    fn log_save_result(&self, path: &Path) -> Result<()> {
        let file_size = std::fs::metadata(path)?.len();
        log::debug!("Saved image: {} ({} bytes)", path.display(), file_size);
        Ok(())
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(95)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, RgbaImage};
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn png_round_trip_is_pixel_exact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let image = gradient(64, 48);

        Compressor::default()
            .save_with_format(&image, &path, ImageFormat::Png)
            .unwrap();

        let reread = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reread, image.to_rgb8());
    }

    #[test]
    fn webp_is_encoded_losslessly() {
        let image = gradient(32, 32);
        let bytes = Compressor::default()
            .compress_to_bytes(&image, ImageFormat::WebP)
            .unwrap();

        let reread = image::load_from_memory_with_format(&bytes, ImageFormat::WebP)
            .unwrap()
            .to_rgb8();
        assert_eq!(reread, image.to_rgb8());
    }

    #[test]
    fn jpeg_accepts_images_with_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(16, 16));
        let bytes = Compressor::new(90)
            .compress_to_bytes(&image, ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(Compressor::new(0).quality, 1);
        assert_eq!(Compressor::new(200).quality, 100);
    }
}
