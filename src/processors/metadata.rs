// yapt/src/processors/metadata.rs
use chrono::{NaiveDate, NaiveDateTime};
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Source of capture metadata for an image file.
pub trait MetadataReader: Send + Sync {
    /// Best capture timestamp recorded in the file, if any.
    fn read_timestamp(&self, path: &Path) -> Option<NaiveDateTime>;

    /// EXIF orientation in `1..=8`, if any.
    fn read_orientation(&self, path: &Path) -> Option<u32>;
}

/// Date tags in the order they are trusted.
const TIMESTAMP_TAGS: [Tag; 3] = [Tag::DateTime, Tag::DateTimeOriginal, Tag::DateTimeDigitized];

/// Reads EXIF blocks with kamadak-exif.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifReader;

impl ExifReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_metadata(&self, path: &Path) -> Option<Exif> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                log::debug!("Cannot open {} for EXIF: {}", path.display(), e);
                return None;
            }
        };
        let mut bufreader = BufReader::new(&file);

        match Reader::new().read_from_container(&mut bufreader) {
            Ok(exif) => {
                log::debug!("Found EXIF data in {}", path.display());
                Some(exif)
            }
            Err(exif::Error::NotFound(_)) => {
                log::debug!("No EXIF data found in {}", path.display());
                None
            }
            Err(e) => {
                log::debug!("Failed to read EXIF from {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl MetadataReader for ExifReader {
    fn read_timestamp(&self, path: &Path) -> Option<NaiveDateTime> {
        let exif = self.read_metadata(path)?;
        TIMESTAMP_TAGS
            .iter()
            .find_map(|tag| field_datetime(&exif, *tag))
    }

    fn read_orientation(&self, path: &Path) -> Option<u32> {
        let exif = self.read_metadata(path)?;
        let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
        match field.value.get_uint(0) {
            Some(v @ 1..=8) => Some(v),
            _ => None,
        }
    }
}

fn field_datetime(exif: &Exif, tag: Tag) -> Option<NaiveDateTime> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref values) => values.first().and_then(|raw| parse_exif_datetime(raw)),
        _ => None,
    }
}

/// Parses the `YYYY:MM:DD HH:MM:SS` form EXIF stores dates in.
pub fn parse_exif_datetime(raw: &[u8]) -> Option<NaiveDateTime> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    NaiveDate::from_ymd_opt(dt.year as i32, dt.month as u32, dt.day as u32)?.and_hms_opt(
        dt.hour as u32,
        dt.minute as u32,
        dt.second as u32,
    )
}
