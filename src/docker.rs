//! Container invocation for one platform build.
//!
//! The actual compilation happens inside the builder image, driven by the
//! gitian descriptors. All this module does is assemble the `docker run`
//! command line and hand it to a [`CommandRunner`], which is the seam tests
//! replace with a recording fake.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::Command;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::config::BuildConfig;
use crate::platform::Platform;

/// Mount point of the cache directory inside the container.
const CONTAINER_CACHE_DIR: &str = "/shared/cache";

/// Mount point of the result directory inside the container.
const CONTAINER_RESULT_DIR: &str = "/shared/result";

// ---------------------------------------------------------------------------
// Process boundary
// ---------------------------------------------------------------------------

/// A program, its arguments and the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Shell-like rendering used in messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a finished command ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured stdout and stderr. Empty when output went to the terminal.
    pub output: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external command to completion.
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutcome>;
}

/// Runs commands as real child processes with inherited stdio, so the build
/// log streams straight to the operator's terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutcome> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute {}", command.program))?;
        Ok(CommandOutcome {
            code: status.code(),
            output: String::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Build request
// ---------------------------------------------------------------------------

/// Everything needed for one container run. Built right before the run and
/// dropped after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub platform: Platform,
    pub tag: String,
    pub org_project: String,
    pub docker_image: String,
    pub started_at: OffsetDateTime,
}

impl BuildRequest {
    pub fn new(platform: Platform, tag: &str, org_project: &str, config: &BuildConfig) -> Self {
        Self {
            platform,
            tag: tag.to_string(),
            org_project: org_project.to_string(),
            docker_image: config.docker_image.clone(),
            started_at: OffsetDateTime::now_utc(),
        }
    }

    /// Container name, unique per second: `{prefix}-{unix timestamp}`.
    pub fn container_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.started_at.unix_timestamp())
    }

    /// Start time in `ctime` style, e.g. `Mon Oct 19 14:03:07 2026 UTC`.
    pub fn started_at_display(&self) -> String {
        let format = format_description!(
            "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year] UTC"
        );
        self.started_at
            .format(format)
            .unwrap_or_else(|_| self.started_at.unix_timestamp().to_string())
    }
}

/// Assemble the `docker run` invocation for `request`.
pub fn docker_command(request: &BuildRequest, config: &BuildConfig, cwd: &Path) -> CommandSpec {
    let cache = config.cache_dir_in(cwd);
    let result = config.result_dir_in(cwd);
    let descriptor = format!(
        "{}/{}",
        config.descriptor_dir,
        request.platform.descriptor_file_name()
    );

    let args = vec![
        "run".to_string(),
        "--rm".to_string(),
        "--name".to_string(),
        request.container_name(&config.container_prefix),
        "-v".to_string(),
        format!("{}:{CONTAINER_CACHE_DIR}:Z", cache.display()),
        "-v".to_string(),
        format!("{}:{CONTAINER_RESULT_DIR}:Z", result.display()),
        request.docker_image.clone(),
        request.tag.clone(),
        request.org_project.clone(),
        descriptor,
    ];

    CommandSpec {
        program: config.docker_bin.clone(),
        args,
        cwd: Some(cwd.to_path_buf()),
    }
}

/// Run an assembled build command and fail unless it exits with status 0.
///
/// Nothing the container prints is inspected. On failure no cleanup of
/// partial results is attempted.
pub fn run_build(runner: &dyn CommandRunner, command: &CommandSpec) -> Result<()> {
    let outcome = runner
        .run(command)
        .with_context(|| format!("Build failed with error: could not run '{}'", command.display()))?;

    if !outcome.success() {
        let status = match outcome.code {
            Some(code) => format!("returned non-zero exit status {code}"),
            None => "was terminated by a signal".to_string(),
        };
        let captured = outcome.output.trim();
        if captured.is_empty() {
            bail!("Build failed with error: Command '{}' {status}.", command.display());
        }
        bail!(
            "Build failed with error: Command '{}' {status}.\n{captured}",
            command.display()
        );
    }

    Ok(())
}
