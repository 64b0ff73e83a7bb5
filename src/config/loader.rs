use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::MonitorError;

use super::{paths, Config};

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let config_path = paths::get_config_path();
        let mut config = match Self::load_from(&config_path).await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();

        info!(
            host = %config.host,
            port = config.port,
            ssl = config.use_ssl,
            devices = config.monitored_devices.len(),
            "Loaded configuration"
        );
        config
    }

    /// Read and parse a config file. A missing file yields the defaults.
    pub async fn load_from(path: &Path) -> Result<Self, MonitorError> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| MonitorError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents)
            .map_err(|err| MonitorError::Config(format!("Failed to parse config.json: {err}")))
    }

    /// `EMBY_HOST`, `EMBY_PORT` and `EMBY_API_KEY` take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(host) = non_empty_var("EMBY_HOST") {
            self.host = host;
        }
        if let Some(port) = non_empty_var("EMBY_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(err) => warn!(value = %port, error = %err, "Ignoring invalid EMBY_PORT"),
            }
        }
        if let Some(api_key) = non_empty_var("EMBY_API_KEY") {
            self.api_key = api_key;
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
