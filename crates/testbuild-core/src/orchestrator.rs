//! Step sequencing: optional reset, then configure, build and test.

use crate::command::{self, Invocation};
use crate::error::{OrchestrateError, Result};
use crate::invoke::{Invoker, Step, StepOutcome, SystemInvoker};
use crate::options::InvocationOptions;
use crate::settings::BuildSettings;
use crate::workdir::WorkDir;
use std::path::{Path, PathBuf};

/// The project handed to CMake: the workspace this tool lives in.
///
/// The location is baked in at compile time from the crate's manifest
/// directory and is not configurable. It is checked at run time, so a binary
/// copied away from a workspace that has since moved or been deleted fails
/// with [`OrchestrateError::ProjectRoot`] instead of pointing cmake at a
/// missing tree.
pub fn project_root() -> Result<PathBuf> {
    workspace_root(Path::new(env!("CARGO_MANIFEST_DIR")))
}

fn workspace_root(manifest_dir: &Path) -> Result<PathBuf> {
    // crates/testbuild-core -> crates -> workspace root
    let root = manifest_dir
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| OrchestrateError::ProjectRoot(manifest_dir.to_path_buf()))?;

    if !root.is_dir() {
        return Err(OrchestrateError::ProjectRoot(root.to_path_buf()));
    }
    Ok(root.to_path_buf())
}

/// Outcomes of every step of a run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    outcomes: Vec<StepOutcome>,
}

impl RunReport {
    pub fn new(outcomes: Vec<StepOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.step == step)
    }

    /// Steps that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    /// True when every step ran and succeeded.
    pub fn success(&self) -> bool {
        self.outcomes.len() == Step::ALL.len() && self.outcomes.iter().all(StepOutcome::succeeded)
    }
}

/// Drives cmake, make and the test binary for one project root.
pub struct Orchestrator<I = SystemInvoker> {
    settings: BuildSettings,
    project_root: PathBuf,
    invoker: I,
}

impl Orchestrator<SystemInvoker> {
    /// Orchestrator for this workspace, with settings from its
    /// `testbuild.toml` if present.
    pub fn for_workspace() -> Result<Self> {
        let root = project_root()?;
        let settings = BuildSettings::discover(&root)?;
        let invoker = SystemInvoker::new(settings.output);
        Ok(Self::new(settings, root, invoker))
    }
}

impl<I: Invoker> Orchestrator<I> {
    pub fn new(settings: BuildSettings, project_root: impl Into<PathBuf>, invoker: I) -> Self {
        Self {
            settings,
            project_root: project_root.into(),
            invoker,
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn into_invoker(self) -> I {
        self.invoker
    }

    /// The CMake command line `configure` would run.
    pub fn configure_command(&self, options: &InvocationOptions) -> Invocation {
        command::configure_command(options, &self.settings, &self.project_root)
    }

    /// Generate the build files in `dir`.
    pub fn configure(&mut self, options: &InvocationOptions, dir: &WorkDir) -> StepOutcome {
        let invocation = self.configure_command(options);
        self.execute(Step::Configure, &invocation, dir)
    }

    /// Compile with the configured parallelism.
    pub fn make(&mut self, dir: &WorkDir) -> StepOutcome {
        let invocation = command::build_command(&self.settings);
        self.execute(Step::Build, &invocation, dir)
    }

    /// Run the compiled test binary.
    pub fn test(&mut self, dir: &WorkDir) -> StepOutcome {
        let invocation = command::test_command();
        self.execute(Step::Test, &invocation, dir)
    }

    /// Reset `dir` if a rebuild was requested, then configure, build and
    /// test in that order.
    ///
    /// Only a failed reset is an error. Tool failures are collected in the
    /// report and do not stop later steps.
    pub fn run(&mut self, options: &InvocationOptions, dir: &WorkDir) -> Result<RunReport> {
        tracing::info!("Build directory: {}", dir.path().display());

        if options.rebuild_requested {
            dir.reset()?;
        }

        let outcomes = vec![
            self.configure(options, dir),
            self.make(dir),
            self.test(dir),
        ];
        let report = RunReport::new(outcomes);

        if report.success() {
            tracing::info!("Configure, build and test succeeded");
        } else {
            let failed: Vec<_> = report.failures().map(|o| o.step.name()).collect();
            tracing::error!("Failed steps: {}", failed.join(", "));
        }

        Ok(report)
    }

    fn execute(&mut self, step: Step, invocation: &Invocation, dir: &WorkDir) -> StepOutcome {
        tracing::info!("Running {} step: {}", step, invocation.command_line());

        let outcome = self.invoker.invoke(step, invocation, dir);
        if !outcome.succeeded() {
            tracing::warn!("{} step: {}", step, outcome.status);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::StepStatus;

    /// Records invocations and answers with a fixed status per step.
    #[derive(Default)]
    struct ScriptedInvoker {
        calls: Vec<(Step, String)>,
        failing: Vec<Step>,
    }

    impl Invoker for ScriptedInvoker {
        fn invoke(&mut self, step: Step, invocation: &Invocation, _dir: &WorkDir) -> StepOutcome {
            self.calls.push((step, invocation.command_line()));
            let status = if self.failing.contains(&step) {
                StepStatus::Failed(1)
            } else {
                StepStatus::Success
            };
            StepOutcome::new(step, invocation, status)
        }
    }

    fn orchestrator(invoker: ScriptedInvoker) -> Orchestrator<ScriptedInvoker> {
        Orchestrator::new(BuildSettings::default(), "/src/datetime/tests", invoker)
    }

    #[test]
    fn test_project_root_contains_crates_dir() {
        let root = project_root().unwrap();
        assert!(Path::new(env!("CARGO_MANIFEST_DIR")).starts_with(root.join("crates")));
    }

    #[test]
    fn test_missing_workspace_is_project_root_error() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let gone = temp_dir.path().join("moved");
        let manifest_dir = gone.join("crates/testbuild-core");

        match workspace_root(&manifest_dir) {
            Err(OrchestrateError::ProjectRoot(path)) => assert_eq!(path, gone),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_manifest_dir_without_parents() {
        assert!(matches!(
            workspace_root(Path::new("/")),
            Err(OrchestrateError::ProjectRoot(_))
        ));
    }

    #[test]
    fn test_step_command_lines_logged_at_info() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct SharedBuf(Arc<Mutex<Vec<u8>>>);

        impl Write for SharedBuf {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let options = InvocationOptions::new().library_search_path("/opt/boost/lib");
        tracing::subscriber::with_default(subscriber, || {
            let mut orch = orchestrator(ScriptedInvoker::default());
            orch.run(&options, &WorkDir::new("/work/build")).unwrap();
        });

        let logs = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Build directory: /work/build"), "{logs}");
        assert!(logs.contains(
            "-DCMAKE_CXX_STANDARD=17 -DBOOST_LIBRARY_DIRS=/opt/boost/lib /src/datetime/tests"
        ));
        assert!(logs.contains("make -j 10"), "{logs}");
        assert!(logs.contains("./tests"), "{logs}");
    }

    #[test]
    fn test_failures_do_not_stop_later_steps() {
        let invoker = ScriptedInvoker {
            failing: vec![Step::Configure, Step::Build],
            ..Default::default()
        };
        let mut orch = orchestrator(invoker);

        let report = orch
            .run(&InvocationOptions::new(), &WorkDir::new("/nonexistent/build"))
            .unwrap();

        assert_eq!(orch.invoker().calls.len(), 3);
        assert!(!report.success());
        let failed: Vec<_> = report.failures().map(|o| o.step).collect();
        assert_eq!(failed, vec![Step::Configure, Step::Build]);
        assert!(report.outcome(Step::Test).unwrap().succeeded());
    }

    #[test]
    fn test_build_flag_runs_default_sequence() {
        let mut plain = orchestrator(ScriptedInvoker::default());
        let mut build = orchestrator(ScriptedInvoker::default());
        let dir = WorkDir::new("/nonexistent/build");

        plain.run(&InvocationOptions::new(), &dir).unwrap();
        build.run(&InvocationOptions::new().build(true), &dir).unwrap();

        assert_eq!(plain.invoker().calls, build.invoker().calls);
    }

    #[test]
    fn test_empty_report_is_not_success() {
        assert!(!RunReport::default().success());
    }
}
