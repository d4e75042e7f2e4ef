// yapt/src/processors/loader.rs
use crate::core::{Result, YaptError};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// A decoded image together with the container format it was read from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((100_000, 100_000)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    pub fn load(&self, path: &Path) -> Result<DecodedImage> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;

        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .or_else(|| ImageFormat::from_path(path).ok())
            .ok_or_else(|| {
                YaptError::ProcessingError(format!("Unknown image format: {}", path.display()))
            })?;
        let image = reader.decode()?;

        if let Some((max_w, max_h)) = self.max_dimensions {
            if image.width() > max_w || image.height() > max_h {
                return Err(YaptError::ProcessingError(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    image.width(),
                    image.height(),
                    max_w,
                    max_h
                )));
            }
        }

        log::debug!(
            "Loaded image: {}x{} pixels, format: {:?}",
            image.width(),
            image.height(),
            format
        );

        Ok(DecodedImage { image, format })
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(YaptError::ProcessingError(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
