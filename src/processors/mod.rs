// yapt/src/processors/mod.rs
mod catalog;
mod compressor;
mod dispatcher;
mod loader;
mod metadata;
mod naming;
mod resizer;

pub use catalog::{Catalog, FileCatalog};
pub use compressor::Compressor;
pub use dispatcher::TaskDispatcher;
pub use loader::{DecodedImage, Loader};
pub use metadata::{parse_exif_datetime, ExifReader, MetadataReader};
pub use naming::{name_timestamp, NameNormalizer};
pub use resizer::{fit_dimensions, orientation_rotation, Resizer};

use crate::core::Result;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Decode, resize, rotate and encode primitives used by the actions.
pub trait ImageCodec: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedImage>;

    /// Aspect-preserving downscale so the image fits in `bounds`.
    fn resize_to_fit(&self, image: &DynamicImage, bounds: (u32, u32)) -> DynamicImage;

    /// Counter-clockwise rotation by 0, 90, 180 or 270 degrees.
    fn rotate(&self, image: DynamicImage, degrees: u32) -> DynamicImage;

    fn encode(&self, image: &DynamicImage, format: ImageFormat, path: &Path) -> Result<()>;
}

/// `image` crate decoding, Lanczos3 resizing and lossless re-encoding.
pub struct StandardCodec {
    loader: Loader,
    resizer: Resizer,
    compressor: Compressor,
}

impl StandardCodec {
    pub fn new(quality: u8) -> Self {
        Self {
            loader: Loader::new(),
            resizer: Resizer::default(),
            compressor: Compressor::new(quality),
        }
    }
}

impl Default for StandardCodec {
    fn default() -> Self {
        Self::new(95)
    }
}

impl ImageCodec for StandardCodec {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        self.loader.load(path)
    }

    fn resize_to_fit(&self, image: &DynamicImage, bounds: (u32, u32)) -> DynamicImage {
        self.resizer.fit(image, bounds)
    }

    fn rotate(&self, image: DynamicImage, degrees: u32) -> DynamicImage {
        self.resizer.rotate(image, degrees)
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat, path: &Path) -> Result<()> {
        self.compressor.save_with_format(image, path, format)
    }
}

pub mod prelude {
    pub use super::{
        Compressor, ExifReader, FileCatalog, ImageCodec, Loader, MetadataReader, NameNormalizer,
        Resizer, StandardCodec, TaskDispatcher,
    };
}
