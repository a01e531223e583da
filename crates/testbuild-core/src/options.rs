//! Parsed invocation intent.

use std::path::{Path, PathBuf};

/// What the user asked for on the command line.
///
/// Built once per run and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOptions {
    /// Overrides the Boost library directory handed to CMake.
    pub library_search_path: Option<PathBuf>,
    /// `--build`. Accepted, runs the same steps as the default path.
    pub build_requested: bool,
    /// `--rebuild`. Wipe and recreate the working directory first.
    pub rebuild_requested: bool,
}

impl InvocationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the library search path.
    pub fn library_search_path(mut self, path: impl AsRef<Path>) -> Self {
        self.library_search_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(mut self, requested: bool) -> Self {
        self.build_requested = requested;
        self
    }

    pub fn rebuild(mut self, requested: bool) -> Self {
        self.rebuild_requested = requested;
        self
    }
}
