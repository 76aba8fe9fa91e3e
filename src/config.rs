//! Build configuration.
//!
//! Everything the build flow needs to know about its environment lives in one
//! immutable [`BuildConfig`] that is passed by reference into each step.
//! Values come from built-in defaults, optionally overridden by a
//! `gitian-build.toml` file in the working directory, with the API base URL
//! additionally overridable from the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Repository whose tags are listed when none is given on the command line.
pub const DEFAULT_ORG_PROJECT: &str = "rupaya-project/rupaya";

/// Platforms built when none are given on the command line.
pub const DEFAULT_PLATFORMS: [&str; 3] = ["osx", "win", "linux"];

/// GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const DEFAULT_DOCKER_BIN: &str = "docker";
const DEFAULT_DOCKER_IMAGE: &str = "builder";
const DEFAULT_CONTAINER_PREFIX: &str = "builder";
const DEFAULT_CACHE_DIR: &str = "cache";
const DEFAULT_RESULT_DIR: &str = "result";
const DEFAULT_DESCRIPTOR_DIR: &str = "../rupaya/contrib/gitian-descriptors";

/// Extracted SDK archive that must be present in the cache for osx builds.
pub const DEFAULT_MACOS_SDK_ARCHIVE: &str =
    "Xcode-11.3.1-11C505-extracted-SDK-with-libcxx-headers.tar.gz";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "gitian-build.toml";

/// Environment variable pointing at an alternative config file.
const CONFIG_PATH_ENV_VAR: &str = "GITIAN_BUILD_CONFIG";

/// Environment variable overriding the API base URL.
const API_URL_ENV_VAR: &str = "GITIAN_BUILD_API_URL";

/// On-disk overrides. Every field is optional; absent fields keep the default.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub org_project: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub docker_bin: Option<String>,
    pub docker_image: Option<String>,
    pub container_prefix: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub result_dir: Option<PathBuf>,
    pub descriptor_dir: Option<String>,
    pub macos_sdk_archive: Option<String>,
    pub api_url: Option<String>,
    pub max_prompt_attempts: Option<u32>,
}

impl ConfigFile {
    /// Load overrides from `path`. A missing file yields no overrides.
    ///
    /// Parse errors and other I/O errors are hard failures so a typo in the
    /// file never silently falls back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file at {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read config file at {}", path.display()))
            }
        }
    }
}

/// Resolved, immutable configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub org_project: String,
    pub platforms: Vec<String>,
    pub docker_bin: String,
    pub docker_image: String,
    pub container_prefix: String,
    pub cache_dir: PathBuf,
    pub result_dir: PathBuf,
    /// Descriptor directory as seen from inside the build container.
    pub descriptor_dir: String,
    pub macos_sdk_archive: String,
    pub api_url: String,
    /// `None` keeps prompting until a valid choice is entered.
    pub max_prompt_attempts: Option<u32>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            org_project: DEFAULT_ORG_PROJECT.to_string(),
            platforms: DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect(),
            docker_bin: DEFAULT_DOCKER_BIN.to_string(),
            docker_image: DEFAULT_DOCKER_IMAGE.to_string(),
            container_prefix: DEFAULT_CONTAINER_PREFIX.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            result_dir: PathBuf::from(DEFAULT_RESULT_DIR),
            descriptor_dir: DEFAULT_DESCRIPTOR_DIR.to_string(),
            macos_sdk_archive: DEFAULT_MACOS_SDK_ARCHIVE.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            max_prompt_attempts: None,
        }
    }
}

impl BuildConfig {
    /// Load the configuration for the current process.
    ///
    /// Reads `$GITIAN_BUILD_CONFIG` if set, otherwise `gitian-build.toml` in
    /// the working directory, then applies `$GITIAN_BUILD_API_URL`.
    pub fn load() -> Result<Self> {
        let path = non_empty_trimmed(std::env::var(CONFIG_PATH_ENV_VAR).ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        let file = ConfigFile::load_from(&path)?;
        Ok(Self::from_layers(file, std::env::var(API_URL_ENV_VAR).ok()))
    }

    /// Merge defaults, file overrides and the API URL env value.
    ///
    /// Empty or whitespace-only string values at any layer are treated as
    /// absent and fall through to the next layer.
    pub fn from_layers(file: ConfigFile, api_url_env: Option<String>) -> Self {
        let defaults = Self::default();
        let platforms = match file.platforms {
            Some(list) if !list.is_empty() => list,
            _ => defaults.platforms,
        };
        Self {
            org_project: non_empty_trimmed(file.org_project).unwrap_or(defaults.org_project),
            platforms,
            docker_bin: non_empty_trimmed(file.docker_bin).unwrap_or(defaults.docker_bin),
            docker_image: non_empty_trimmed(file.docker_image).unwrap_or(defaults.docker_image),
            container_prefix: non_empty_trimmed(file.container_prefix)
                .unwrap_or(defaults.container_prefix),
            cache_dir: file.cache_dir.unwrap_or(defaults.cache_dir),
            result_dir: file.result_dir.unwrap_or(defaults.result_dir),
            descriptor_dir: non_empty_trimmed(file.descriptor_dir)
                .map(|d| d.trim_end_matches('/').to_string())
                .unwrap_or(defaults.descriptor_dir),
            macos_sdk_archive: non_empty_trimmed(file.macos_sdk_archive)
                .unwrap_or(defaults.macos_sdk_archive),
            api_url: non_empty_trimmed(api_url_env)
                .or_else(|| non_empty_trimmed(file.api_url))
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            max_prompt_attempts: file.max_prompt_attempts.filter(|n| *n > 0),
        }
    }

    /// Whether the API URL is plain HTTP (callers should warn).
    pub fn api_url_is_non_https(&self) -> bool {
        !self.api_url.starts_with("https://")
    }

    /// Host cache directory, with a relative `cache_dir` taken from `cwd`.
    pub fn cache_dir_in(&self, cwd: &Path) -> PathBuf {
        resolve_host_dir(&self.cache_dir, cwd)
    }

    /// Host result directory, with a relative `result_dir` taken from `cwd`.
    pub fn result_dir_in(&self, cwd: &Path) -> PathBuf {
        resolve_host_dir(&self.result_dir, cwd)
    }

    /// Path of the SDK archive osx builds need in the cache directory.
    pub fn macos_sdk_path(&self, cwd: &Path) -> PathBuf {
        self.cache_dir_in(cwd).join(&self.macos_sdk_archive)
    }
}

/// Resolve a host directory against `cwd`. Absolute paths are kept as is.
///
/// The osx prerequisite check and the `-v` mounts both go through here, so
/// they always see the same directory.
pub fn resolve_host_dir(dir: &Path, cwd: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}

/// Return the trimmed value if non-empty after trimming, otherwise `None`.
fn non_empty_trimmed(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
