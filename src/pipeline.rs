//! The end-to-end build run: resolve platforms, list tags once, then for each
//! platform check prerequisites, ask for a tag and run the container.
//!
//! Strictly sequential. The first fatal error stops the run; platforms after
//! it are not attempted.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::docker::{self, BuildRequest, CommandRunner};
use crate::output;
use crate::platform::{self, Platform};
use crate::precheck;
use crate::select;

/// What the operator asked for on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    pub org_project: Option<String>,
    pub platforms: Vec<String>,
}

/// The collaborators of a run. Production wires up stdio and real processes;
/// tests pass buffers and a recording runner.
pub struct Session<'a> {
    pub config: &'a BuildConfig,
    pub runner: &'a dyn CommandRunner,
    pub input: &'a mut dyn BufRead,
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
    /// Working directory the cache and result paths are resolved against.
    pub cwd: PathBuf,
    /// Color for lines written to `out`.
    pub color: bool,
    /// Color for lines written to `err`.
    pub err_color: bool,
}

/// Run the whole flow for `args`.
pub fn run(session: &mut Session<'_>, args: &BuildArgs) -> Result<()> {
    let org_project = args
        .org_project
        .clone()
        .unwrap_or_else(|| session.config.org_project.clone());
    let requested = if args.platforms.is_empty() {
        session.config.platforms.clone()
    } else {
        args.platforms.clone()
    };

    let platforms = resolve_platforms(session, &requested);
    if platforms.is_empty() {
        output::warn_to_with_tty(
            session.err,
            "no supported platforms requested",
            session.err_color,
        );
        return Ok(());
    }

    let tags = crate::github::fetch_tags(&session.config.api_url, &org_project)?;
    crate::github::require_tags(&tags, &org_project)?;

    build_platforms(session, &tags, &platforms, &org_project)
}

/// Parse platform names, warning about and dropping the unsupported ones.
pub fn resolve_platforms(session: &mut Session<'_>, requested: &[String]) -> Vec<Platform> {
    let selection = platform::parse_platforms(requested);
    for name in &selection.skipped {
        output::warn_to_with_tty(
            session.err,
            &format!("skipping unsupported platform '{name}' (expected osx, win or linux)"),
            session.err_color,
        );
    }
    selection.valid
}

/// Build each platform in order against an already fetched tag list.
pub fn build_platforms(
    session: &mut Session<'_>,
    tags: &[String],
    platforms: &[Platform],
    org_project: &str,
) -> Result<()> {
    for &platform in platforms {
        build_one(session, tags, platform, org_project)?;
    }
    Ok(())
}

fn build_one(
    session: &mut Session<'_>,
    tags: &[String],
    platform: Platform,
    org_project: &str,
) -> Result<()> {
    let config = session.config;
    precheck::check_platform(platform, config, &session.cwd)?;

    let tag = select::select_tag(
        tags,
        &mut *session.input,
        &mut *session.out,
        config.max_prompt_attempts,
    )?;

    let request = BuildRequest::new(platform, &tag, org_project, config);
    output::action_to_with_tty(
        session.out,
        "Starting",
        &format!(
            "{platform} build of tag: {} at: {}",
            request.tag,
            request.started_at_display()
        ),
        session.color,
    );
    let command = docker::docker_command(&request, config, &session.cwd);
    output::detail_to_with_tty(session.out, &command.display(), session.color);

    docker::run_build(session.runner, &command)?;

    output::success_to_with_tty(
        session.out,
        "Finished",
        &format!("{platform} build of tag: {}", request.tag),
        session.color,
    );
    Ok(())
}
