//! Tag listing against the GitHub REST API.
//!
//! One unauthenticated `GET /repos/{owner}/{repo}/tags` per run. Tag names are
//! normalized on the way out so callers only ever see the release part of the
//! name (`v1.2.3-rc1` becomes `v1.2.3`).

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::time::Duration;

/// User-Agent header sent with API requests. GitHub rejects requests without one.
const USER_AGENT: &str = concat!("gitian-build/", env!("CARGO_PKG_VERSION"));

const ACCEPT: &str = "application/vnd.github+json";

/// One entry of the tags listing. Only the name is used.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TagEntry {
    pub name: String,
}

/// GitHub's JSON error body, e.g. `{"message": "Not Found", ...}`.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Strip everything from the first hyphen on.
pub fn normalize_tag(raw: &str) -> &str {
    match raw.split_once('-') {
        Some((head, _)) => head,
        None => raw,
    }
}

/// Build the tags endpoint URL for `org_project` under `api_url`.
pub fn tags_url(api_url: &str, org_project: &str) -> String {
    format!("{}/repos/{}/tags", api_url.trim_end_matches('/'), org_project)
}

/// Fetch the tags of `org_project` and return their normalized names in API order.
///
/// The identifier is not validated locally; a malformed one comes back as an
/// HTTP error. There is no request timeout and no retry.
pub fn fetch_tags(api_url: &str, org_project: &str) -> Result<Vec<String>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(None::<Duration>)
        .build()
        .context("failed to build HTTP client")?;

    let url = tags_url(api_url, org_project);
    let resp = client
        .get(&url)
        .header(reqwest::header::ACCEPT, ACCEPT)
        .send()
        .with_context(|| format!("failed to connect to {url}"))?;

    let status = resp.status();
    let body = resp
        .text()
        .with_context(|| format!("failed to read response body from {url}"))?;

    if !status.is_success() {
        bail!(
            "listing tags for '{org_project}' failed (HTTP {status}): {}",
            extract_error_message(&body)
        );
    }

    parse_tags(&body).with_context(|| format!("unexpected tags response from {url}"))
}

/// Parse a tags listing body into normalized names, keeping order.
pub fn parse_tags(body: &str) -> Result<Vec<String>> {
    let entries: Vec<TagEntry> =
        serde_json::from_str(body).context("failed to parse tags response")?;
    Ok(entries
        .iter()
        .map(|entry| normalize_tag(&entry.name).to_string())
        .collect())
}

/// Fail when there is nothing to build.
pub fn require_tags(tags: &[String], org_project: &str) -> Result<()> {
    if tags.is_empty() {
        bail!("no tags found for '{org_project}', nothing to build");
    }
    Ok(())
}

/// Pull `message` out of a GitHub error body, falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ApiError>(body) {
        return err.message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no details provided".to_string();
    }

    // Keep huge HTML error pages out of the terminal
    if trimmed.chars().count() > 200 {
        let head: String = trimmed.chars().take(200).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
