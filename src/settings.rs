//! Site settings.
//!
//! Where the metrics service lives and where graph state is kept.
//! Defaults point at a local service; an optional settings file and
//! `METRICWATCH_*` environment variables override them, and CLI flags
//! override both (applied by the binary).
//!
//! ```toml
//! endpoint = "http://metrics.example.net:8080"
//! state_file = "/var/lib/metricwatch/graphs.json"
//! ```

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_ENDPOINT: &str = "http://localhost:8080";
const DEFAULT_STATE_FILE: &str = "metricwatch-graphs.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base URL of the metrics service.
    pub endpoint: String,
    /// Backing file for persisted graph configurations.
    pub state_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file, and environment
    /// variables, in increasing precedence.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("state_file", DEFAULT_STATE_FILE)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("METRICWATCH"))
            .build()?
            .try_deserialize()
    }
}
