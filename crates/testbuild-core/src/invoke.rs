//! External process execution.
//!
//! Each step produces a [`StepOutcome`] instead of an error: a failing
//! cmake, make or test binary is recorded, and the run moves on.

use crate::command::Invocation;
use crate::settings::OutputMode;
use crate::workdir::WorkDir;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// The three steps of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Configure,
    Build,
    Test,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Configure, Step::Build, Step::Test];

    pub fn name(self) -> &'static str {
        match self {
            Step::Configure => "configure",
            Step::Build => "build",
            Step::Test => "test",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an external process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Exited with status 0.
    Success,
    /// Exited with a non-zero status.
    Failed(i32),
    /// Terminated without an exit code (killed by a signal).
    Terminated,
    /// The program could not be started at all.
    SpawnFailed(String),
}

impl StepStatus {
    pub fn from_exit_status(status: ExitStatus) -> Self {
        if status.success() {
            return StepStatus::Success;
        }
        match status.code() {
            Some(code) => StepStatus::Failed(code),
            None => StepStatus::Terminated,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Success)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Success => write!(f, "ok"),
            StepStatus::Failed(code) => write!(f, "exit status {}", code),
            StepStatus::Terminated => write!(f, "terminated by signal"),
            StepStatus::SpawnFailed(reason) => write!(f, "failed to start: {}", reason),
        }
    }
}

/// Result of running one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    /// The rendered command line that was run.
    pub command: String,
    pub status: StepStatus,
    /// Captured stdout. Empty unless output is captured.
    pub stdout: String,
    /// Captured stderr. Empty unless output is captured.
    pub stderr: String,
}

impl StepOutcome {
    pub fn new(step: Step, invocation: &Invocation, status: StepStatus) -> Self {
        Self {
            step,
            command: invocation.command_line(),
            status,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn with_output(mut self, stdout: &[u8], stderr: &[u8]) -> Self {
        self.stdout = String::from_utf8_lossy(stdout).into_owned();
        self.stderr = String::from_utf8_lossy(stderr).into_owned();
        self
    }

    pub fn succeeded(&self) -> bool {
        self.status.is_success()
    }
}

/// Runs an invocation to completion inside a working directory.
pub trait Invoker {
    fn invoke(&mut self, step: Step, invocation: &Invocation, dir: &WorkDir) -> StepOutcome;
}

/// Invoker backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInvoker {
    output: OutputMode,
}

impl SystemInvoker {
    pub fn new(output: OutputMode) -> Self {
        Self { output }
    }
}

impl Invoker for SystemInvoker {
    fn invoke(&mut self, step: Step, invocation: &Invocation, dir: &WorkDir) -> StepOutcome {
        let mut cmd = Command::new(resolve_program(invocation.program(), dir));
        cmd.args(invocation.args()).current_dir(dir.path());

        match self.output {
            OutputMode::Inherit => match cmd.status() {
                Ok(status) => {
                    StepOutcome::new(step, invocation, StepStatus::from_exit_status(status))
                }
                Err(e) => StepOutcome::new(step, invocation, StepStatus::SpawnFailed(e.to_string())),
            },
            OutputMode::Capture => match cmd.output() {
                Ok(output) => {
                    StepOutcome::new(step, invocation, StepStatus::from_exit_status(output.status))
                        .with_output(&output.stdout, &output.stderr)
                }
                Err(e) => StepOutcome::new(step, invocation, StepStatus::SpawnFailed(e.to_string())),
            },
        }
    }
}

/// Relative paths such as `./tests` name a file inside the working
/// directory; bare names are left for `PATH` lookup.
fn resolve_program(program: &str, dir: &WorkDir) -> PathBuf {
    let path = Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        dir.path().join(path)
    } else {
        path.to_path_buf()
    }
}
