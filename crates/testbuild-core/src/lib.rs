//! Configure, build and run the C++ test project.
//!
//! A run is a fixed sequence of external tools executed in a build
//! directory:
//!
//! ```text
//! [--rebuild: wipe + recreate build dir]
//!   -> cmake -G "Unix Makefiles" -DCMAKE_BUILD_TYPE=Debug ... <project root>
//!   -> make -j 10
//!   -> ./tests
//! ```
//!
//! Every step runs even if an earlier one failed; the [`RunReport`] says
//! which ones did.
//!
//! # Example
//!
//! ```no_run
//! use testbuild_core::{InvocationOptions, Orchestrator, WorkDir};
//!
//! let options = InvocationOptions::new().library_search_path("/opt/boost/lib");
//! let mut orchestrator = Orchestrator::for_workspace()?;
//! let report = orchestrator.run(&options, &WorkDir::current()?)?;
//! assert!(report.success());
//! # Ok::<(), testbuild_core::OrchestrateError>(())
//! ```
//!
//! The cmake/make programs and the output mode can be set with a `testbuild.toml` in the
//! project root:
//!
//! ```toml
//! [build]
//! make = "gmake"
//! output = "capture"
//! ```

mod command;
mod error;
mod invoke;
mod options;
mod orchestrator;
mod settings;
mod workdir;

pub use command::{
    build_command, configure_command, test_command, Invocation, BUILD_TYPE, CXX_STANDARD, GENERATOR,
    JOBS, TEST_BINARY,
};
pub use error::{OrchestrateError, Result};
pub use invoke::{Invoker, Step, StepOutcome, StepStatus, SystemInvoker};
pub use options::InvocationOptions;
pub use orchestrator::{project_root, Orchestrator, RunReport};
pub use settings::{BuildSettings, OutputMode, SETTINGS_FILE};
pub use workdir::WorkDir;
