use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::process;

use gitian_build::config::BuildConfig;
use gitian_build::docker::SystemRunner;
use gitian_build::output;
use gitian_build::pipeline::{self, BuildArgs, Session};

/// Build binaries for different platforms using Gitian descriptors.
///
/// Lists the release tags of a GitHub repository, asks which tag to build for
/// each platform, and runs the builder container for it.
#[derive(Parser, Debug)]
#[command(
    name = "gitian-build",
    about,
    after_help = "Examples:\n  gitian-build\n  gitian-build rupaya-project/rupaya linux\n  gitian-build my-org/my-coin osx win"
)]
struct Cli {
    /// GitHub organization and project (default: rupaya-project/rupaya).
    #[arg(value_name = "ORG/PROJECT")]
    org_project: Option<String>,

    /// Platforms to build (default: osx win linux).
    #[arg(value_name = "PLATFORM")]
    platforms: Vec<String>,
}

impl From<Cli> for BuildArgs {
    fn from(cli: Cli) -> Self {
        BuildArgs {
            org_project: cli.org_project,
            platforms: cli.platforms,
        }
    }
}

fn run(args: BuildArgs) -> Result<()> {
    let config = BuildConfig::load()?;
    if config.api_url_is_non_https() {
        output::warn(&format!("API URL {} is not using HTTPS", config.api_url));
    }

    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let mut err = io::stderr();

    let mut session = Session {
        config: &config,
        runner: &SystemRunner,
        input: &mut input,
        out: &mut out,
        err: &mut err,
        cwd,
        color: output::is_stdout_tty(),
        err_color: output::is_stderr_tty(),
    };
    pipeline::run(&mut session, &args)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli.into()) {
        output::fail("Error", &format!("{e:#}"));
        process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
