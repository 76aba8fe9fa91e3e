//! Supported build platforms and parsing of the platform arguments.

use anyhow::{Result, bail};
use std::fmt;
use std::str::FromStr;

/// A target operating system with a matching gitian descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Osx,
    Win,
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Osx, Platform::Win, Platform::Linux];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Osx => "osx",
            Platform::Win => "win",
            Platform::Linux => "linux",
        }
    }

    /// File name of the gitian descriptor for this platform, e.g. `gitian-osx.yml`.
    pub fn descriptor_file_name(self) -> String {
        format!("gitian-{}.yml", self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "osx" => Ok(Platform::Osx),
            "win" => Ok(Platform::Win),
            "linux" => Ok(Platform::Linux),
            other => bail!(
                "unsupported platform '{other}' (expected one of: {})",
                Platform::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// Platform arguments split into the ones we can build and the ones we can't.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PlatformSelection {
    pub valid: Vec<Platform>,
    pub skipped: Vec<String>,
}

/// Parse the requested platform names, keeping their order.
///
/// Unknown names are collected in `skipped` rather than rejected; the caller
/// warns about them and carries on with the rest.
pub fn parse_platforms<S: AsRef<str>>(names: &[S]) -> PlatformSelection {
    let mut selection = PlatformSelection::default();
    for name in names {
        let name = name.as_ref();
        match name.parse::<Platform>() {
            Ok(platform) => selection.valid.push(platform),
            Err(_) => selection.skipped.push(name.to_string()),
        }
    }
    selection
}
