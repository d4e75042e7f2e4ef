// yapt/src/core/state.rs
use super::{Action, YaptError};
use crate::utils::format_file_size;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// A per-file failure as it appears in the summary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileError {
    pub file: PathBuf,
    pub kind: String,
    pub message: String,
}

impl FileError {
    pub fn new(file: &Path, error: &YaptError) -> Self {
        Self {
            file: file.to_path_buf(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}: {}]", self.file.display(), self.kind, self.message)
    }
}

/// Counters and logs shared by every worker during one action.
///
/// All updates go through atomics or a mutex, so workers can record their
/// outcomes without coordinating with each other.
#[derive(Debug)]
pub struct RunState {
    action: Action,
    dry_run: bool,
    files_count: usize,
    new_files_count: AtomicUsize,
    new_files_size: AtomicU64,
    renamed: AtomicUsize,
    deleted: AtomicUsize,
    resized: AtomicUsize,
    optimized: AtomicUsize,
    touched: AtomicUsize,
    to_rename: AtomicUsize,
    success: Mutex<Vec<String>>,
    errors: Mutex<Vec<FileError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A worker panicking mid-push leaves the log usable.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RunState {
    pub fn new(action: Action, dry_run: bool, files_count: usize, files_size: u64) -> Self {
        Self {
            action,
            dry_run,
            files_count,
            new_files_count: AtomicUsize::new(files_count),
            new_files_size: AtomicU64::new(files_size),
            renamed: AtomicUsize::new(0),
            deleted: AtomicUsize::new(0),
            resized: AtomicUsize::new(0),
            optimized: AtomicUsize::new(0),
            touched: AtomicUsize::new(0),
            to_rename: AtomicUsize::new(0),
            success: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn files_count(&self) -> usize {
        self.files_count
    }

    pub fn new_files_count(&self) -> usize {
        self.new_files_count.load(Ordering::SeqCst)
    }

    pub fn new_files_size(&self) -> u64 {
        self.new_files_size.load(Ordering::SeqCst)
    }

    pub fn renamed(&self) -> usize {
        self.renamed.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> usize {
        self.deleted.load(Ordering::SeqCst)
    }

    pub fn resized(&self) -> usize {
        self.resized.load(Ordering::SeqCst)
    }

    pub fn optimized(&self) -> usize {
        self.optimized.load(Ordering::SeqCst)
    }

    pub fn touched(&self) -> usize {
        self.touched.load(Ordering::SeqCst)
    }

    pub fn to_rename(&self) -> usize {
        self.to_rename.load(Ordering::SeqCst)
    }

    pub fn success(&self) -> Vec<String> {
        lock(&self.success).clone()
    }

    pub fn errors(&self) -> Vec<FileError> {
        lock(&self.errors).clone()
    }

    pub(crate) fn add_success(&self, message: String) {
        log::debug!("{}", message);
        lock(&self.success).push(message);
    }

    pub(crate) fn add_error(&self, file: &Path, error: &YaptError) {
        log::warn!("{}: {}", file.display(), error);
        lock(&self.errors).push(FileError::new(file, error));
    }

    pub(crate) fn inc_renamed(&self) {
        self.renamed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn inc_deleted(&self) {
        self.deleted.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn inc_resized(&self) {
        self.resized.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn inc_optimized(&self) {
        self.optimized.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn inc_touched(&self) {
        self.touched.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn inc_to_rename(&self) {
        self.to_rename.fetch_add(1, Ordering::SeqCst);
    }

    /// Drops a file from the processed set.
    pub(crate) fn remove_file(&self, size: u64) {
        let _ = self
            .new_files_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                Some(count.saturating_sub(1))
            });
        self.adjust_size(|total| total.saturating_sub(size));
    }

    /// Replaces a source's size by the size of what was written for it.
    pub(crate) fn replace_size(&self, before: u64, after: u64) {
        self.adjust_size(|total| total.saturating_sub(before).saturating_add(after));
    }

    // Sizes are re-read from disk, so they may disagree with discovery.
    fn adjust_size(&self, update: impl Fn(u64) -> u64) {
        let _ = self
            .new_files_size
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |total| Some(update(total)));
    }

    /// Header printed before an action runs.
    pub fn title(&self) -> String {
        let mut title = self.action.to_string();
        if self.dry_run {
            title.push_str(" OnlyTest");
        }
        let _ = write!(title, " {} File(s)", self.files_count);
        title
    }

    /// Human readable report, meant to be read after all workers joined.
    pub fn summary(&self) -> String {
        let mut out = String::new();

        let mut errors = self.errors();
        if !errors.is_empty() {
            errors.sort();
            let _ = writeln!(out, "\n{} Errors:", self.action);
            for error in &errors {
                let _ = writeln!(out, "\t{}", error);
            }
        }

        let mut success = self.success();
        if !success.is_empty() {
            success.sort();
            let _ = writeln!(out, "\n{} Success:", self.action);
            for line in &success {
                let _ = writeln!(out, "\t{}", line);
            }
        }

        let _ = writeln!(out, "\nResult\n------");
        let _ = writeln!(
            out,
            "- File(s)   : {} Size {}",
            self.new_files_count(),
            format_file_size(self.new_files_size())
        );

        let counters = [
            ("Renamed", self.renamed()),
            ("To rename", self.to_rename()),
            ("Deleted", self.deleted()),
            ("Touched", self.touched()),
            ("Resized", self.resized()),
            ("Optimized", self.optimized()),
        ];
        for (label, value) in counters {
            if value > 0 {
                let _ = writeln!(out, "- {:10}: {}", label, value);
            }
        }
        if !errors.is_empty() {
            let _ = writeln!(out, "- {:10}: {}", "Errors", errors.len());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_from_discovered_totals() {
        let state = RunState::new(Action::List, true, 3, 3000);
        assert_eq!(state.new_files_count(), 3);
        assert_eq!(state.new_files_size(), 3000);
        assert_eq!(state.title(), "list OnlyTest 3 File(s)");
    }

    #[test]
    fn size_and_count_adjustments() {
        let state = RunState::new(Action::Thumbnails, false, 2, 1000);
        state.replace_size(600, 100);
        state.remove_file(400);
        assert_eq!(state.new_files_count(), 1);
        assert_eq!(state.new_files_size(), 100);
        assert_eq!(state.title(), "thumbnails 2 File(s)");
    }

    #[test]
    fn size_adjustments_never_wrap() {
        let state = RunState::new(Action::Thumbnails, false, 1, 0);
        state.replace_size(500, 100);
        assert_eq!(state.new_files_size(), 100);
        state.remove_file(4096);
        state.remove_file(0);
        assert_eq!(state.new_files_size(), 0);
        assert_eq!(state.new_files_count(), 0);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let state = Arc::new(RunState::new(Action::List, true, 0, 0));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    for j in 0..250 {
                        state.inc_optimized();
                        state.add_success(format!("{}-{}", i, j));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(state.optimized(), 2000);
        assert_eq!(state.success().len(), 2000);
    }

    #[test]
    fn summary_lists_errors_successes_and_counters() {
        let state = RunState::new(Action::Rename, false, 2, 2048);
        state.add_success("b.jpg >> Renamed".to_string());
        state.add_error(
            Path::new("a.jpg"),
            &YaptError::NoDateFound("a.jpg".to_string()),
        );
        state.inc_renamed();

        let summary = state.summary();
        assert!(summary.contains("rename Errors:"));
        assert!(summary.contains("a.jpg [NoDateFound: No date found in file name or EXIF of a.jpg]"));
        assert!(summary.contains("rename Success:"));
        assert!(summary.contains("b.jpg >> Renamed"));
        assert!(summary.contains("- Renamed   : 1"));
        assert!(summary.contains("2.00 KB"));
        assert!(!summary.contains("Deleted"));
    }
}
