use std::collections::HashMap;

use config::{Config as ConfigLib, ConfigError, Environment, File};
use serde::Deserialize;

/// Component id of the production CRLSet snapshot.
const CRLSET_COMPONENT_ID: &str = "hfnkpimlhhgieaddgfemjhofmfblmnib";
/// Default Omaha update-check endpoint.
const UPDATE_ENDPOINT: &str = "https://clients2.google.com/service/update2/crx";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub update: UpdateConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConfig {
    /// Component id whose signing key must match the container.
    pub component_id: String,
    /// Omaha update-check endpoint.
    pub endpoint: String,
    /// Version advertised in the update check; empty requests the latest.
    pub version: String,
    /// HTTP timeout for both the update check and the download.
    pub timeout_secs: u64,
    /// Partial-fetch size for the sequence probe.
    pub probe_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("update.component_id", CRLSET_COMPONENT_ID)?
            .set_default("update.endpoint", UPDATE_ENDPOINT)?
            .set_default("update.version", "")?
            .set_default("update.timeout_secs", 30)?
            .set_default("update.probe_bytes", 8192)?
            .add_source(File::with_name("config/settings").required(false));

        // If env_vars is provided, we use it instead of system environment
        // This is to avoid systems variables pollution across tests
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = builder.set_override(&key, value)?;
            }
        } else {
            // Use system environment variables
            // Should be in the format APP_UPDATE__COMPONENT_ID
            builder = builder.add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        builder.build()?.try_deserialize()
    }
}
