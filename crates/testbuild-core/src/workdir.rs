//! The build directory every step runs in.

use crate::error::{OrchestrateError, Result};
use std::path::{Path, PathBuf};

/// Directory in which configuration, build and test run.
///
/// Captured once at start-up and handed to each step explicitly. The process
/// current directory is never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Capture the process current directory.
    pub fn current() -> Result<Self> {
        std::env::current_dir()
            .map(Self::new)
            .map_err(OrchestrateError::CurrentDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recursively delete the directory and recreate it empty.
    ///
    /// A directory that is already gone is recreated rather than reported.
    pub fn reset(&self) -> Result<()> {
        let reset_err = |source| OrchestrateError::DirectoryReset {
            path: self.path.clone(),
            source,
        };

        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(reset_err(e)),
        }
        std::fs::create_dir_all(&self.path).map_err(reset_err)?;

        tracing::info!("Recreated build directory {}", self.path.display());
        Ok(())
    }
}
