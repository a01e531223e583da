use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use testbuild_core::{InvocationOptions, Orchestrator, RunReport, WorkDir};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Configure, build and run the C++ test project in the current directory.
#[derive(Parser, Debug)]
#[command(name = "testbuild")]
#[command(author, version, about)]
struct Cli {
    /// Path to a custom Boost library directory
    #[arg(long = "boost_lib_dir", value_name = "PATH")]
    boost_lib_dir: Option<PathBuf>,

    /// Configure and build
    #[arg(long)]
    build: bool,

    /// Clean the build directory, then configure and build
    #[arg(long)]
    rebuild: bool,
}

impl Cli {
    fn options(&self) -> InvocationOptions {
        let mut options = InvocationOptions::new()
            .build(self.build)
            .rebuild(self.rebuild);
        if let Some(dir) = &self.boost_lib_dir {
            options = options.library_search_path(dir);
        }
        options
    }
}

/// Logs go to stderr; stdout belongs to cmake, make and the tests.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "testbuild=info,testbuild_core=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn report_failures(report: &RunReport) {
    for outcome in report.failures() {
        eprintln!("{} failed ({}): {}", outcome.step, outcome.status, outcome.command);
        if !outcome.stdout.is_empty() {
            eprintln!("{}", outcome.stdout.trim_end());
        }
        if !outcome.stderr.is_empty() {
            eprintln!("{}", outcome.stderr.trim_end());
        }
    }
}

/// 0 only when configure, build and test all succeeded.
fn exit_code(report: &RunReport) -> u8 {
    if report.success() {
        0
    } else {
        1
    }
}

fn main() -> Result<ExitCode> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    // Exits with usage and status 2 on bad arguments.
    let cli = Cli::parse();
    init_tracing();

    let options = cli.options();
    tracing::debug!(?options, "Parsed options");
    let workdir = WorkDir::current()?;
    let mut orchestrator = Orchestrator::for_workspace()?;

    // Reset and settings errors leave through miette with status 1.
    let report = orchestrator.run(&options, &workdir)?;
    report_failures(&report);
    Ok(ExitCode::from(exit_code(&report)))
}
