// yapt/src/utils/mod.rs
use crate::core::Result;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use std::fs::{File, FileTimes};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Raster formats the codec can decode, lowercase and without the dot.
pub const IMAGE_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "jpe", "png", "gif", "bmp", "tif", "tiff", "webp",
];

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

pub fn is_supported_format(path: &Path) -> bool {
    get_file_extension(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Modification time of `path` in local time, truncated to the second.
pub fn file_mtime(path: &Path) -> Result<NaiveDateTime> {
    let modified = std::fs::metadata(path)?.modified()?;
    let local: DateTime<Local> = modified.into();
    let naive = local.naive_local();
    Ok(naive.with_nanosecond(0).unwrap_or(naive))
}

/// Sets access and modification time of `path`, reading `timestamp` as local time.
pub fn set_file_mtime(path: &Path, timestamp: NaiveDateTime) -> Result<()> {
    let time = local_system_time(timestamp);
    let file = File::options().write(true).open(path)?;
    file.set_times(FileTimes::new().set_accessed(time).set_modified(time))?;
    Ok(())
}

fn local_system_time(timestamp: NaiveDateTime) -> SystemTime {
    match Local.from_local_datetime(&timestamp).earliest() {
        Some(local) => local.into(),
        // Skipped by a DST jump: the wall clock time never existed locally.
        None => Local.from_utc_datetime(&timestamp).into(),
    }
}

/// Mirrors `file` under `target`, keeping only the first `flat` directories
/// of its path relative to `root`.
pub fn flattened_destination(root: &Path, file: &Path, target: &Path, flat: usize) -> PathBuf {
    let mut destination = target.to_path_buf();

    if let Ok(relative) = file.strip_prefix(root) {
        if let Some(parent) = relative.parent() {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part),
                    _ => None,
                })
                .take(flat)
                .for_each(|part| destination.push(part));
        }
    }

    if let Some(name) = file.file_name() {
        destination.push(name);
    }
    destination
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(is_supported_format(Path::new("a/b/IMG_1.JPG")));
        assert!(is_supported_format(Path::new("scan.Tiff")));
        assert!(!is_supported_format(Path::new("notes.txt")));
        assert!(!is_supported_format(Path::new("jpg")));
    }

    #[test]
    fn flatten_keeps_leading_directories() {
        let root = Path::new("/src");
        let file = Path::new("/src/2016/july/beach/a.jpg");
        let target = Path::new("/out");

        assert_eq!(flattened_destination(root, file, target, 0), Path::new("/out/a.jpg"));
        assert_eq!(flattened_destination(root, file, target, 1), Path::new("/out/2016/a.jpg"));
        assert_eq!(
            flattened_destination(root, file, target, 2),
            Path::new("/out/2016/july/a.jpg")
        );
        assert_eq!(
            flattened_destination(root, file, target, 10),
            Path::new("/out/2016/july/beach/a.jpg")
        );
    }

    #[test]
    fn flatten_of_file_outside_root_uses_file_name() {
        let dest = flattened_destination(Path::new("/src"), Path::new("/else/a.jpg"), Path::new("/out"), 1);
        assert_eq!(dest, Path::new("/out/a.jpg"));
    }

    #[test]
    fn mtime_round_trips_through_local_time() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.jpg");
        std::fs::write(&path, b"data").unwrap();

        let when = NaiveDate::from_ymd_opt(2016, 7, 12)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        set_file_mtime(&path, when).unwrap();
        assert_eq!(file_mtime(&path).unwrap(), when);
    }
}
