//! Process-wide configuration, loaded from a TOML file.
//!
//! Threaded explicitly through constructors (`MetaStore::open`,
//! `BackingStore::new`) rather than read from ambient globals, so both
//! stores stay testable with an in-memory or tempdir config.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Settings read from `rfsd.toml` and overridable on the command line.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Absolute host directory the backing store is rooted at.
    pub backing_root: PathBuf,
    /// Path to the SQLite database file holding the metadata store.
    pub database_path: PathBuf,
    /// Address the HTTP server binds to, e.g. `"0.0.0.0:8080"`.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Base URL of the authentication collaborator's signup endpoint, used
    /// by the default [`crate::signup::HttpSignupSink`].
    #[serde(default)]
    pub auth_base_url: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_owned()
}

impl Config {
    /// Parse a config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| crate::Error::invalid(format!("reading config: {e}")))?;
        toml::from_str(&text).map_err(|e| crate::Error::invalid(format!("parsing config: {e}")))
    }
}
