//! Write-if-modified output.
//!
//! A file is only touched when its content changes, so unchanged artifacts
//! keep their timestamps and do not trigger rebuilds.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Updated,
    Unchanged,
    /// Content differs but dry run suppressed the write
    WouldUpdate,
}

/// Writes artifacts below an output root.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
    dry_run: bool,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Write `content` to `relative` unless the file already holds it.
    pub fn write_if_modified(&self, relative: &Path, content: &str) -> Result<WriteOutcome> {
        let path = self.root.join(relative);

        if let Ok(existing) = fs::read_to_string(&path) {
            if existing == content {
                log::debug!("* Skipping file '{}' because it is up-to-date", path.display());
                return Ok(WriteOutcome::Unchanged);
            }
        }

        if self.dry_run {
            log::warn!("* Dry run: not updating outdated file '{}'", path.display());
            return Ok(WriteOutcome::WouldUpdate);
        }

        log::info!("* Updating outdated file '{}'", path.display());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(WriteOutcome::Updated)
    }
}
