//! Command lines for the configure, build and test steps.
//!
//! Construction is pure: nothing here touches the filesystem or spawns a
//! process. [`Invoker`](crate::Invoker) implementations execute the result.

use crate::options::InvocationOptions;
use crate::settings::BuildSettings;
use std::fmt;
use std::path::Path;

/// A single external process invocation: a program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a `-D<name>=<value>` cache definition.
    pub fn define(self, name: &str, value: impl fmt::Display) -> Self {
        self.arg(format!("-D{}={}", name, value))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Render as a single shell-style command line.
    ///
    /// Arguments containing whitespace or quotes are double-quoted.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(word: &str) -> String {
    let needs_quotes =
        word.is_empty() || word.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'');
    if !needs_quotes {
        return word.to_string();
    }

    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Generator passed with `-G`.
pub const GENERATOR: &str = "Unix Makefiles";

/// Value of `CMAKE_BUILD_TYPE`.
pub const BUILD_TYPE: &str = "Debug";

/// Value of `CMAKE_CXX_STANDARD`.
pub const CXX_STANDARD: u32 = 17;

/// Parallel job slots passed to make.
pub const JOBS: u32 = 10;

/// Test executable, relative to the working directory.
pub const TEST_BINARY: &str = "./tests";

/// Build the CMake configuration command.
///
/// The Boost library clause is only present when a library search path was
/// given; the path is passed through unvalidated. The project root is always
/// the final argument.
pub fn configure_command(
    options: &InvocationOptions,
    settings: &BuildSettings,
    project_root: &Path,
) -> Invocation {
    let mut cmd = Invocation::new(&settings.cmake)
        .arg("-G")
        .arg(GENERATOR)
        .define("CMAKE_BUILD_TYPE", BUILD_TYPE)
        .define("CMAKE_EXPORT_COMPILE_COMMANDS", 1)
        .define("CMAKE_CXX_STANDARD", CXX_STANDARD);

    if let Some(lib_dir) = &options.library_search_path {
        cmd = cmd.define("BOOST_LIBRARY_DIRS", lib_dir.display());
    }

    cmd.arg(project_root.to_string_lossy())
}

/// Build the `make -j 10` command.
pub fn build_command(settings: &BuildSettings) -> Invocation {
    Invocation::new(&settings.make)
        .arg("-j")
        .arg(JOBS.to_string())
}

/// Build the test binary invocation. No arguments are passed.
pub fn test_command() -> Invocation {
    Invocation::new(TEST_BINARY)
}
