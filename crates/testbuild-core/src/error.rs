//! Error types for testbuild-core.
//!
//! Failures of the external tools are not errors here: they are recorded in
//! each step's [`StepOutcome`](crate::StepOutcome). Only problems that stop a
//! run before its steps execute end up in [`OrchestrateError`].

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for testbuild-core operations.
pub type Result<T> = std::result::Result<T, OrchestrateError>;

/// Errors that abort an orchestration run.
#[derive(Error, Debug, Diagnostic)]
pub enum OrchestrateError {
    /// Failed to delete or recreate the working directory on rebuild.
    #[error("Failed to reset build directory {}: {source}", .path.display())]
    #[diagnostic(
        code(testbuild::directory_reset),
        help("check permissions on the build directory, or run without --rebuild")
    )]
    DirectoryReset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process current directory could not be determined.
    #[error("Failed to determine current directory: {0}")]
    #[diagnostic(code(testbuild::current_dir))]
    CurrentDir(#[source] std::io::Error),

    /// The project root could not be derived from the crate location.
    #[error("Project root not found above {}", .0.display())]
    #[diagnostic(code(testbuild::project_root))]
    ProjectRoot(PathBuf),

    /// Failed to read the settings file.
    #[error("Failed to read settings file: {0}")]
    #[diagnostic(code(testbuild::read_settings))]
    ReadSettings(#[from] std::io::Error),

    /// Failed to parse the settings file.
    #[error("Failed to parse settings file: {0}")]
    #[diagnostic(
        code(testbuild::parse_settings),
        help("the [build] table accepts only cmake, make and output; generator, build type, C++ standard, jobs and test binary are fixed")
    )]
    ParseSettings(#[from] toml::de::Error),
}
