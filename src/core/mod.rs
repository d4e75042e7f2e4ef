// yapt/src/core/mod.rs
pub mod engine;
pub mod state;

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use engine::ActionEngine;
pub use state::{FileError, RunState};

/// Bulk operations applied to every discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Count,
    List,
    CheckNames,
    Rename,
    Touch,
    Optimize,
    Thumbnails,
    FlatCopy,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Count => "count",
            Action::List => "list",
            Action::CheckNames => "checknames",
            Action::Rename => "rename",
            Action::Touch => "touch",
            Action::Optimize => "optimize",
            Action::Thumbnails => "thumbnails",
            Action::FlatCopy => "flatcp",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bounding box an image must fit in before it is left unresized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSpec {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSpec {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn exceeded_by(&self, width: u32, height: u32) -> bool {
        width > self.width || height > self.height
    }
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// When set, the source tree is never modified.
    pub dry_run: bool,
    pub recursive: bool,
    /// Leading source directories kept when mirroring into the target.
    pub flat: usize,
    /// Worker threads; zero runs every file on the calling thread.
    pub threads: usize,
    pub target: Option<PathBuf>,
    pub thumbnail: ThumbnailSpec,
    pub quality: u8,
    pub show_progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            recursive: true,
            flat: 1,
            threads: 5,
            target: None,
            thumbnail: ThumbnailSpec::default(),
            quality: 95,
            show_progress: false,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.thumbnail.width == 0 || self.thumbnail.height == 0 {
            return Err(YaptError::InvalidParameter(
                "Thumbnail width and height must be greater than zero".to_string(),
            ));
        }

        if self.thumbnail.width > 100_000 || self.thumbnail.height > 100_000 {
            return Err(YaptError::InvalidParameter(
                "Thumbnail dimensions too large (max 100,000 pixels)".to_string(),
            ));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(YaptError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum YaptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG optimization failed: {0}")]
    Png(String),

    #[error("Path {} does not exist", .0.display())]
    SourceNotFound(PathBuf),

    #[error("No images found in {}", .0.display())]
    NoImagesFound(PathBuf),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No date found in file name or EXIF of {0}")]
    NoDateFound(String),

    #[error("should be renamed to {0}")]
    NeedsRename(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),
}

impl YaptError {
    /// Category shown next to per-file errors in the summary.
    pub fn kind(&self) -> &'static str {
        match self {
            YaptError::Io(_) => "IoError",
            YaptError::Image(_) => "ImageError",
            YaptError::Png(_) => "PngError",
            YaptError::SourceNotFound(_) => "SourceNotFound",
            YaptError::NoImagesFound(_) => "NoImagesFound",
            YaptError::InvalidTarget(_) => "InvalidTarget",
            YaptError::InvalidParameter(_) => "InvalidParameter",
            YaptError::NoDateFound(_) => "NoDateFound",
            YaptError::NeedsRename(_) => "NeedsRename",
            YaptError::ProcessingError(_) => "ProcessingError",
        }
    }
}

pub type Result<T> = std::result::Result<T, YaptError>;

pub fn validate_config(config: &RunConfig) -> Result<()> {
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_dry_run() {
        let config = RunConfig::default();
        assert!(config.dry_run);
        assert_eq!(config.threads, 5);
        assert_eq!(config.thumbnail, ThumbnailSpec::new(800, 600));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_empty_thumbnail_box() {
        let config = RunConfig {
            thumbnail: ThumbnailSpec::new(0, 600),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(YaptError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let config = RunConfig {
            quality: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn box_is_exceeded_by_either_dimension() {
        let bounds = ThumbnailSpec::new(800, 600);
        assert!(bounds.exceeded_by(801, 10));
        assert!(bounds.exceeded_by(10, 601));
        assert!(!bounds.exceeded_by(800, 600));
    }

    #[test]
    fn error_kind_names_the_category() {
        let err = YaptError::NoDateFound("a.jpg".to_string());
        assert_eq!(err.kind(), "NoDateFound");
        let err: YaptError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), "IoError");
    }
}
