//! Batch importer: walks a directory tree and registers every file found as a
//! catalog entry, deriving tags from the folder names along its path.

use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::database::ports::{ScreenshotRepository, TagRepository};
use crate::error::{CatalogError, Result};
use chartshot_model::NewScreenshot;

/// Outcome of one import run. `total_files` is every regular file discovered
/// under the root, whether or not it was already cataloged; the CLI reports
/// this number on success.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ImportOutcome {
    pub total_files: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

pub struct ScreenshotImporter<'a> {
    screenshots: &'a dyn ScreenshotRepository,
    tags: &'a dyn TagRepository,
    public_root: PathBuf,
}

impl std::fmt::Debug for ScreenshotImporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenshotImporter")
            .field("public_root", &self.public_root)
            .finish_non_exhaustive()
    }
}

impl<'a> ScreenshotImporter<'a> {
    /// `public_root` is the fixed storage base all persisted paths are
    /// relative to, independent of the root passed to [`import`](Self::import).
    pub fn new(
        screenshots: &'a dyn ScreenshotRepository,
        tags: &'a dyn TagRepository,
        public_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            screenshots,
            tags,
            public_root: public_root.into(),
        }
    }

    /// Import every regular file under `root`, skipping paths already in the
    /// catalog. Idempotent: a second run over an unchanged tree imports
    /// nothing and errors on nothing.
    ///
    /// A missing or non-directory root aborts the run; a failure on an
    /// individual file is recorded in the outcome and the walk continues.
    pub async fn import(&self, root: &Path) -> Result<ImportOutcome> {
        if !root.exists() {
            return Err(CatalogError::PathNotFound(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(CatalogError::PathNotFound(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        info!(root = %root.display(), "starting screenshot import");

        let mut outcome = ImportOutcome::default();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("error walking directory: {e}");
                    outcome.errors.push(format!("directory walk error: {e}"));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            outcome.total_files += 1;

            match self.import_file(entry.path()).await {
                Ok(true) => outcome.imported += 1,
                Ok(false) => outcome.skipped += 1,
                Err(e) => {
                    warn!(path = %entry.path().display(), "import failed: {e}");
                    outcome
                        .errors
                        .push(format!("{}: {e}", entry.path().display()));
                }
            }
        }

        info!(
            total = outcome.total_files,
            imported = outcome.imported,
            skipped = outcome.skipped,
            errors = outcome.errors.len(),
            "screenshot import complete"
        );

        Ok(outcome)
    }

    /// Returns `Ok(true)` when the file was newly cataloged, `Ok(false)` when
    /// its path was already present.
    async fn import_file(&self, path: &Path) -> Result<bool> {
        let relative = relative_storage_path(path, &self.public_root);

        if self.screenshots.exists_by_path(&relative).await? {
            return Ok(false);
        }

        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());

        let created = self
            .screenshots
            .create(NewScreenshot::new(title, relative.clone()))
            .await?;

        let tag_names = derive_tag_names(&relative);
        let mut tag_ids = Vec::with_capacity(tag_names.len());
        for name in &tag_names {
            tag_ids.push(self.tags.get_or_create(name).await?);
        }
        self.screenshots.sync_tags(created.id, &tag_ids).await?;

        Ok(true)
    }
}

/// Path relative to the public storage root, with separators normalized to
/// forward slashes so persisted values are platform-independent. A path
/// outside the root keeps its own components (the importer was pointed at an
/// arbitrary tree).
pub fn relative_storage_path(path: &Path, public_root: &Path) -> String {
    let relative = path.strip_prefix(public_root).unwrap_or(path);

    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => {
                Some(segment.to_string_lossy().into_owned())
            }
            _ => None,
        })
        .collect();

    segments.join("/")
}

/// Folder names between the root marker segment and the file, in path order.
///
/// The first directory component is the fixed marker (conventionally
/// `screenshots`) and never becomes a tag; a file directly inside the marker
/// folder has no tags.
pub fn derive_tag_names(relative_path: &str) -> Vec<String> {
    let Some((directory, _file)) = relative_path.rsplit_once('/') else {
        return Vec::new();
    };

    directory
        .split('/')
        .skip(1)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}
