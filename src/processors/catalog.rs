// yapt/src/processors/catalog.rs
use crate::core::{Result, YaptError};
use crate::utils::is_supported_format;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Image files found under a source root.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    files: Vec<PathBuf>,
    total_size: u64,
}

impl Catalog {
    /// Directory the files are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn count(&self) -> usize {
        self.files.len()
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

pub struct FileCatalog;

impl FileCatalog {
    /// Collects supported images under `root`. A missing root or an empty
    /// result is an error: nothing downstream can run without files.
    pub fn discover(root: &Path, recursive: bool) -> Result<Catalog> {
        if !root.exists() {
            return Err(YaptError::SourceNotFound(root.to_path_buf()));
        }

        let (base, files) = if root.is_file() {
            let base = root.parent().map(Path::to_path_buf).unwrap_or_default();
            let files = if is_supported_format(root) {
                vec![root.to_path_buf()]
            } else {
                Vec::new()
            };
            (base, files)
        } else {
            (root.to_path_buf(), Self::collect_image_paths(root, recursive))
        };

        if files.is_empty() {
            return Err(YaptError::NoImagesFound(root.to_path_buf()));
        }

        let total_size = files
            .iter()
            .map(|path| match std::fs::metadata(path) {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    log::warn!("Cannot stat {}: {}", path.display(), e);
                    0
                }
            })
            .sum();

        log::info!("Found {} images under {}", files.len(), root.display());

        Ok(Catalog {
            root: base,
            files,
            total_size,
        })
    }

    fn collect_image_paths(input_dir: &Path, recursive: bool) -> Vec<PathBuf> {
        let walker = if recursive {
            WalkDir::new(input_dir)
        } else {
            WalkDir::new(input_dir).max_depth(1)
        };

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_format(entry.path()))
            .map(|entry| entry.into_path())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        tmp.child("a.jpg").write_binary(&[0u8; 10]).unwrap();
        tmp.child("B.PNG").write_binary(&[0u8; 20]).unwrap();
        tmp.child("notes.txt").write_str("not an image").unwrap();
        tmp.child("2016/july/c.jpeg").write_binary(&[0u8; 30]).unwrap();
        tmp
    }

    #[test]
    fn recursive_walk_finds_nested_images() {
        let tmp = tree();
        let catalog = FileCatalog::discover(tmp.path(), true).unwrap();
        assert_eq!(catalog.count(), 3);
        assert_eq!(catalog.total_size(), 60);
        assert_eq!(catalog.root(), tmp.path());
    }

    #[test]
    fn shallow_walk_lists_direct_children_only() {
        let tmp = tree();
        let catalog = FileCatalog::discover(tmp.path(), false).unwrap();
        assert_eq!(catalog.count(), 2);
        assert_eq!(catalog.total_size(), 30);
    }

    #[test]
    fn single_file_is_its_own_catalog() {
        let tmp = tree();
        let file = tmp.child("a.jpg");
        let catalog = FileCatalog::discover(file.path(), true).unwrap();
        assert_eq!(catalog.files(), &[file.path().to_path_buf()]);
        assert_eq!(catalog.root(), tmp.path());
    }

    #[test]
    fn single_file_still_needs_an_image_extension() {
        let tmp = tree();
        let result = FileCatalog::discover(tmp.child("notes.txt").path(), true);
        assert!(matches!(result, Err(YaptError::NoImagesFound(_))));
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result = FileCatalog::discover(&tmp.path().join("nope"), true);
        assert!(matches!(result, Err(YaptError::SourceNotFound(_))));
    }

    #[test]
    fn directory_without_images_is_fatal() {
        let tmp = TempDir::new().unwrap();
        tmp.child("readme.md").write_str("# nothing").unwrap();
        let result = FileCatalog::discover(tmp.path(), true);
        assert!(matches!(result, Err(YaptError::NoImagesFound(_))));
    }
}
