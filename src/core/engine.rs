// yapt/src/core/engine.rs
use super::{Action, Result, RunConfig, RunState, YaptError};
use crate::processors::{
    orientation_rotation, Catalog, ExifReader, ImageCodec, MetadataReader, NameNormalizer,
    StandardCodec, TaskDispatcher,
};
use crate::utils::{file_mtime, file_size, flattened_destination, set_file_mtime};
use image::ImageFormat;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Subdirectory of the target receiving untouched copies of failed inputs.
pub const ERRORS_DIR: &str = "errors";

/// Subdirectory of the target receiving optimize output during a dry run.
pub const DRY_RUN_DIR: &str = "dry-run";

/// Directories resolved before dispatch, shared read-only by workers.
#[derive(Debug, Default)]
struct Destinations {
    root: PathBuf,
    output: Option<PathBuf>,
    errors: Option<PathBuf>,
}

impl Destinations {
    fn output(&self) -> Result<&Path> {
        self.output
            .as_deref()
            .ok_or_else(|| YaptError::InvalidTarget("No output directory prepared".to_string()))
    }
}

/// Runs one action over a catalog: pre-flight, concurrent per-file work,
/// then hands back the shared state for reporting.
pub struct ActionEngine {
    config: RunConfig,
    metadata: Arc<dyn MetadataReader>,
    codec: Arc<dyn ImageCodec>,
    normalizer: NameNormalizer,
}

impl ActionEngine {
    pub fn new(config: RunConfig) -> Self {
        let codec = Arc::new(StandardCodec::new(config.quality));
        Self::with_collaborators(config, Arc::new(ExifReader::new()), codec)
    }

    pub fn with_collaborators(
        config: RunConfig,
        metadata: Arc<dyn MetadataReader>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        let normalizer = NameNormalizer::new(Arc::clone(&metadata));
        Self {
            config,
            metadata,
            codec,
            normalizer,
        }
    }

    pub fn process(&self, action: Action, catalog: &Catalog) -> Result<RunState> {
        self.config.validate()?;

        let state = RunState::new(
            action,
            self.config.dry_run,
            catalog.count(),
            catalog.total_size(),
        );
        let destinations = self.prepare(action, catalog)?;

        log::info!("{}", state.title());

        let dispatcher =
            TaskDispatcher::new(self.config.threads)?.with_progress(self.config.show_progress);
        dispatcher.run(catalog.files().to_vec(), |file| {
            self.process_file(action, &destinations, file, &state)
        });

        Ok(state)
    }

    /// Creates every directory the action writes into. Runs on the calling
    /// thread so workers never race to create the same directory.
    fn prepare(&self, action: Action, catalog: &Catalog) -> Result<Destinations> {
        let mut destinations = Destinations {
            root: catalog.root().to_path_buf(),
            ..Default::default()
        };

        match action {
            Action::Thumbnails => {
                let target = self.check_target()?;
                destinations.errors = Some(self.errors_dir(&target)?);

                let dirs: BTreeSet<PathBuf> = catalog
                    .files()
                    .iter()
                    .filter_map(|file| {
                        flattened_destination(catalog.root(), file, &target, self.config.flat)
                            .parent()
                            .map(Path::to_path_buf)
                    })
                    .collect();
                for dir in &dirs {
                    fs::create_dir_all(dir)?;
                }
                log::debug!("Prepared {} destination directories", dirs.len());

                destinations.output = Some(target);
            }
            Action::FlatCopy => {
                let target = self.check_target()?;
                destinations.errors = Some(self.errors_dir(&target)?);
                destinations.output = Some(target);
            }
            Action::Optimize if self.config.dry_run => {
                let staging = self.check_target()?.join(DRY_RUN_DIR);
                fs::create_dir_all(&staging)?;
                destinations.output = Some(staging);
            }
            _ => {}
        }

        Ok(destinations)
    }

    fn check_target(&self) -> Result<PathBuf> {
        let target = self
            .config
            .target
            .clone()
            .ok_or_else(|| YaptError::InvalidTarget("Please select a valid target".to_string()))?;

        if target.exists() {
            if !target.is_dir() {
                return Err(YaptError::InvalidTarget(format!(
                    "{} is not a directory",
                    target.display()
                )));
            }
        } else {
            fs::create_dir_all(&target)?;
        }

        Ok(target)
    }

    fn errors_dir(&self, target: &Path) -> Result<PathBuf> {
        let errors = target.join(ERRORS_DIR);
        fs::create_dir_all(&errors)?;
        Ok(errors)
    }

    fn process_file(&self, action: Action, destinations: &Destinations, file: &Path, state: &RunState) {
        let outcome = match action {
            Action::Count => Ok(()),
            Action::List => {
                state.add_success(file.display().to_string());
                Ok(())
            }
            Action::CheckNames => self.check_name(file, state),
            Action::Rename => self.rename(file, state),
            Action::Touch => self.touch(file, state),
            Action::Optimize => self.optimize(file, destinations, state),
            Action::Thumbnails => self.preserving_failures(file, destinations, state, |file| {
                let output = flattened_destination(
                    &destinations.root,
                    file,
                    destinations.output()?,
                    self.config.flat,
                );
                self.thumbnail(file, &output, state)
            }),
            Action::FlatCopy => self.preserving_failures(file, destinations, state, |file| {
                let output = destinations.output()?.join(file_name(file));
                self.flat_copy(file, &output, state)
            }),
        };

        if let Err(e) = outcome {
            state.add_error(file, &e);
        }
    }

    fn normalized(&self, file: &Path) -> Result<PathBuf> {
        self.normalizer
            .corrected_name(file)
            .ok_or_else(|| YaptError::NoDateFound(file_name(file)))
    }

    fn check_name(&self, file: &Path, state: &RunState) -> Result<()> {
        let target = self.normalized(file)?;
        if target != file {
            state.inc_to_rename();
            return Err(YaptError::NeedsRename(file_name(&target)));
        }
        Ok(())
    }

    fn rename(&self, file: &Path, state: &RunState) -> Result<()> {
        let target = self.normalized(file)?;
        if target == file {
            return Ok(());
        }

        if is_duplicate(file, &target) {
            return self.discard_duplicate(file, &target, state);
        }

        if self.config.dry_run {
            state.inc_to_rename();
            state.add_success(format!(
                "{} >> to be renamed {}",
                file.display(),
                file_name(&target)
            ));
            return Ok(());
        }

        if let Err(e) = fs::rename(file, &target) {
            state.inc_to_rename();
            return Err(e.into());
        }
        state.inc_renamed();
        state.add_success(format!("{} >> Renamed {}", file.display(), file_name(&target)));
        Ok(())
    }

    /// Existing target wins: `file` is dropped in favor of `existing`.
    fn discard_duplicate(&self, file: &Path, existing: &Path, state: &RunState) -> Result<()> {
        let size = file_size(file);
        if self.config.dry_run {
            state.add_success(format!(
                "{} >> to be deleted, {} exists",
                file.display(),
                file_name(existing)
            ));
        } else {
            fs::remove_file(file)?;
            state.add_success(format!(
                "{} >> Deleted, {} exists",
                file.display(),
                file_name(existing)
            ));
        }
        state.inc_deleted();
        state.remove_file(size);
        Ok(())
    }

    fn touch(&self, file: &Path, state: &RunState) -> Result<()> {
        let timestamp = self
            .normalizer
            .best_timestamp(file)
            .ok_or_else(|| YaptError::NoDateFound(file_name(file)))?;

        if file_mtime(file)? == timestamp {
            return Ok(());
        }

        if self.config.dry_run {
            state.add_success(format!("{} >> to be touched {}", file.display(), timestamp));
        } else {
            set_file_mtime(file, timestamp)?;
            state.add_success(format!("{} >> Touched {}", file.display(), timestamp));
        }
        state.inc_touched();
        Ok(())
    }

    fn optimize(&self, file: &Path, destinations: &Destinations, state: &RunState) -> Result<()> {
        let normalized = self
            .normalizer
            .corrected_name(file)
            .unwrap_or_else(|| file.to_path_buf());
        if is_duplicate(file, &normalized) {
            return self.discard_duplicate(file, &normalized, state);
        }

        let output = if self.config.dry_run {
            destinations.output()?.join(file_name(&normalized))
        } else {
            normalized
        };

        let before = file_size(file);
        self.reencode(file, &output)?;

        if !self.config.dry_run && output != file {
            fs::remove_file(file)?;
        }

        state.replace_size(before, file_size(&output));
        state.inc_optimized();
        state.add_success(format!("{} >> Optimized {}", file.display(), output.display()));
        Ok(())
    }

    fn thumbnail(&self, file: &Path, output: &Path, state: &RunState) -> Result<()> {
        let before = file_size(file);
        let decoded = self.codec.decode(file)?;
        let format = ImageFormat::from_path(output).unwrap_or(decoded.format);
        let bounds = self.config.thumbnail;

        let resized = bounds.exceeded_by(decoded.width(), decoded.height());
        if resized {
            let rotation = self
                .metadata
                .read_orientation(file)
                .map(orientation_rotation)
                .unwrap_or(0);
            let image = self
                .codec
                .resize_to_fit(&decoded.image, (bounds.width, bounds.height));
            let image = self.codec.rotate(image, rotation);
            self.codec.encode(&image, format, output)?;
        } else {
            self.codec.encode(&decoded.image, format, output)?;
        }
        self.apply_timestamp(file, output)?;

        state.replace_size(before, file_size(output));
        if resized {
            state.inc_resized();
            state.add_success(format!("{} >> Resized {}", file.display(), output.display()));
        } else {
            state.inc_optimized();
            state.add_success(format!("{} >> Optimized {}", file.display(), output.display()));
        }
        Ok(())
    }

    fn flat_copy(&self, file: &Path, output: &Path, state: &RunState) -> Result<()> {
        let before = file_size(file);
        self.reencode(file, output)?;
        state.replace_size(before, file_size(output));
        state.inc_optimized();
        state.add_success(format!("{} >> Copied {}", file.display(), output.display()));
        Ok(())
    }

    fn reencode(&self, file: &Path, output: &Path) -> Result<()> {
        let decoded = self.codec.decode(file)?;
        let format = ImageFormat::from_path(output).unwrap_or(decoded.format);
        self.codec.encode(&decoded.image, format, output)?;
        self.apply_timestamp(file, output)
    }

    fn apply_timestamp(&self, source: &Path, output: &Path) -> Result<()> {
        if let Some(timestamp) = self.normalizer.best_timestamp(source) {
            set_file_mtime(output, timestamp)?;
        }
        Ok(())
    }

    /// On failure the original is copied untouched into the errors directory
    /// and dropped from the processed set.
    fn preserving_failures<F>(
        &self,
        file: &Path,
        destinations: &Destinations,
        state: &RunState,
        work: F,
    ) -> Result<()>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let result = work(file);
        if result.is_err() {
            if let Some(errors) = &destinations.errors {
                let copy = errors.join(file_name(file));
                if let Err(e) = fs::copy(file, &copy) {
                    log::warn!("Cannot preserve {} in {}: {}", file.display(), errors.display(), e);
                }
            }
            state.remove_file(file_size(file));
        }
        result
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `target` is another file already holding the name `file` should get.
fn is_duplicate(file: &Path, target: &Path) -> bool {
    target != file && target.exists() && !is_same_file(file, target)
}

/// Case-only renames on case-insensitive filesystems make the target "exist".
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
