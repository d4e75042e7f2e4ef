mod cli;
mod core;
mod processors;
mod utils;

pub use crate::cli::{ActionArg, Cli};
pub use crate::core::{
    engine::{DRY_RUN_DIR, ERRORS_DIR},
    validate_config, Action, ActionEngine, FileError, Result, RunConfig, RunState, ThumbnailSpec,
    YaptError,
};
pub use crate::processors::{
    fit_dimensions, name_timestamp, orientation_rotation, parse_exif_datetime, Catalog, Compressor,
    DecodedImage, ExifReader, FileCatalog, ImageCodec, Loader, MetadataReader, NameNormalizer,
    Resizer, StandardCodec, TaskDispatcher,
};
pub use crate::utils::{
    file_mtime, flattened_destination, format_file_size, get_file_extension, is_supported_format,
    set_file_mtime, IMAGE_EXTENSIONS,
};

pub mod prelude {
    pub use crate::processors::prelude::*;
    pub use crate::{Action, ActionEngine, RunConfig, RunState};
}

// Re-export commonly used types
pub use image::DynamicImage;
