//! Optional TOML configuration
//!
//! ```toml
//! [repository]
//! path = "/srv/backup"
//!
//! [log]
//! level = "info"
//! ```
//!
//! Command line flags and `SNIP_REPOSITORY` take precedence over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a `--config` file; every section is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    pub(crate) repository: RepositorySection,
    pub(crate) log: LogSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RepositorySection {
    pub(crate) path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LogSection {
    pub(crate) level: Option<String>,
}

impl CliConfig {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// `explicit` (flag or environment) if given, else the configured path
    pub(crate) fn repository(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.repository.path.clone())
            .context("no repository given (use --repo, SNIP_REPOSITORY or a config file)")
    }
}
