// yapt/src/processors/naming.rs
//! Canonical, date-prefixed file names.
//!
//! A name is derived from the first source that yields a date, in order:
//!
//! 1. a `YYYY MM DD HH MM` sequence in the file name -> `YYYYMMDD_HHMM_rest`
//! 2. a `YYYY MM DD` sequence in the file name -> `YYYYMMDD_rest`
//! 3. the EXIF capture date -> `YYYYMMDD_HHMM_<original name>`
//!
//! Date groups may be separated by any non-digit characters, so
//! `2016-07-12 16.00 beach.jpg` and `IMG_20160712_1600.jpg` are both
//! recognized. Every produced name maps to itself when normalized again.

use super::metadata::MetadataReader;
use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::Arc;

lazy_static! {
    static ref MINUTE_REGEX: Regex =
        Regex::new(r"(\d{4})\D*(\d{2})\D*(\d{2})\D*(\d{2})\D*(\d{2})[-_ ]*(.*)").unwrap();
    static ref DAY_REGEX: Regex = Regex::new(r"(\d{4})\D*(\d{2})\D*(\d{2})[-_ ]*(.*)").unwrap();
    static ref ILLEGAL_CHARS_REGEX: Regex = Regex::new(r#"[<>:/\\|?*"\x00-\x1f]"#).unwrap();
}

/// Camera prefixes rewritten to their usual capitalization.
const PREFIX_SUBSTITUTIONS: [(&str, &str); 2] = [("img_", "IMG_"), ("Img_", "IMG_")];

/// Date recovered from a file name, with the remainder that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NameDate {
    prefix: String,
    remainder: String,
    timestamp: NaiveDateTime,
}

pub struct NameNormalizer {
    metadata: Arc<dyn MetadataReader>,
}

impl NameNormalizer {
    pub fn new(metadata: Arc<dyn MetadataReader>) -> Self {
        Self { metadata }
    }

    /// Canonical path for `path`, in the same directory. Returns `path`
    /// itself when the name is already canonical and `None` when no date
    /// could be found anywhere.
    pub fn corrected_name(&self, path: &Path) -> Option<PathBuf> {
        let file_name = path.file_name()?.to_string_lossy();
        let name = substitute(&file_name);

        let normalized = match parse_name_date(&name) {
            Some(found) => join(&found.prefix, &found.remainder),
            None => {
                let timestamp = self.metadata.read_timestamp(path)?;
                format!("{}_{}", timestamp.format("%Y%m%d_%H%M"), name)
            }
        };

        Some(path.with_file_name(normalized))
    }

    /// EXIF timestamp first, then the date embedded in the file name.
    pub fn best_timestamp(&self, path: &Path) -> Option<NaiveDateTime> {
        self.metadata.read_timestamp(path).or_else(|| {
            path.file_name()
                .and_then(|name| name_timestamp(&substitute(&name.to_string_lossy())))
        })
    }
}

/// Timestamp encoded in a file name; day-only names map to midnight.
pub fn name_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    parse_name_date(file_name).map(|found| found.timestamp)
}

fn substitute(file_name: &str) -> String {
    let mut name = file_name.to_string();
    for (from, to) in PREFIX_SUBSTITUTIONS {
        name = name.replace(from, to);
    }
    ILLEGAL_CHARS_REGEX.replace_all(&name, "_").into_owned()
}

fn parse_name_date(name: &str) -> Option<NameDate> {
    minute_date(name).or_else(|| day_date(name))
}

fn minute_date(name: &str) -> Option<NameDate> {
    let caps = dated_captures(&MINUTE_REGEX, name, |caps| minute_timestamp(caps).is_some())?;
    let timestamp = minute_timestamp(&caps)?;
    let stamp = format!("{}{}{}{}{}", &caps[1], &caps[2], &caps[3], &caps[4], &caps[5]);
    let prefix = format!("{}{}{}_{}{}", &caps[1], &caps[2], &caps[3], &caps[4], &caps[5]);

    // Stamped more than once: keep what follows the last stamp.
    let mut remainder = caps[6].to_string();
    while let Some(rest) = second_stamp_remainder(&remainder) {
        remainder = rest;
    }
    let remainder = strip_stamps(&remainder, &[prefix.as_str(), stamp.as_str()]);

    Some(NameDate {
        prefix,
        remainder,
        timestamp,
    })
}

fn day_date(name: &str) -> Option<NameDate> {
    let caps = dated_captures(&DAY_REGEX, name, |caps| capture_date(caps).is_some())?;
    let timestamp = capture_date(&caps)?.and_hms_opt(0, 0, 0)?;
    let prefix = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
    let remainder = strip_stamps(&caps[4], &[prefix.as_str()]);

    Some(NameDate {
        prefix,
        remainder,
        timestamp,
    })
}

/// First match, trying every digit as a start, whose fields pass `is_valid`.
/// Counters such as `IMG_1692` or `DSC01234` before the real stamp are skipped.
fn dated_captures<'t, F>(regex: &Regex, text: &'t str, is_valid: F) -> Option<Captures<'t>>
where
    F: Fn(&Captures<'t>) -> bool,
{
    text.char_indices()
        .filter(|(_, c)| c.is_ascii_digit())
        .filter_map(|(start, _)| regex.captures(&text[start..]))
        .find(|caps| is_valid(caps))
}

fn second_stamp_remainder(text: &str) -> Option<String> {
    let caps = dated_captures(&MINUTE_REGEX, text, |caps| minute_timestamp(caps).is_some())?;
    Some(caps[6].to_string())
}

fn minute_timestamp(caps: &Captures) -> Option<NaiveDateTime> {
    capture_date(caps)?.and_hms_opt(number(caps, 4)?, number(caps, 5)?, 0)
}

fn capture_date(caps: &Captures) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, number(caps, 2)?, number(caps, 3)?)
}

fn number(caps: &Captures, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn strip_stamps(remainder: &str, stamps: &[&str]) -> String {
    let mut cleaned = remainder.to_string();
    for stamp in stamps {
        cleaned = cleaned.replace(stamp, "");
    }
    cleaned
        .trim_start_matches(&['-', '_', ' '][..])
        .to_string()
}

fn join(prefix: &str, remainder: &str) -> String {
    if remainder.is_empty() || remainder.starts_with('.') {
        format!("{}{}", prefix, remainder)
    } else {
        format!("{}_{}", prefix, remainder)
    }
}
