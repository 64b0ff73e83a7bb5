use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use super::Config;

impl Config {
    /// Base URL of the Emby server, without a trailing slash
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        let host = self.host.trim().trim_end_matches('/');
        format!("{}://{}:{}", scheme, host, self.port)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Get the path to the config.json file
/// Looks for config.json in the app directory (parent of the binary's folder)
pub(super) fn get_config_path() -> PathBuf {
    // Executable is at: app_root/bin/emby-monitor
    // Config should be at: app_root/config.json
    if let Ok(exe_path) = std::env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");

        if let Some(app_root) = exe_path.parent().and_then(|bin_dir| bin_dir.parent()) {
            let config_path = app_root.join("config.json");
            debug!(path = %config_path.display(), "Looking for config");
            if config_path.exists() {
                return config_path;
            }
        }
    }

    warn!("Using fallback: looking for config.json in current directory");
    PathBuf::from("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_follows_tls_flag() {
        let mut config = Config {
            host: "emby.local".to_string(),
            port: 8920,
            ..Config::default()
        };
        assert_eq!(config.base_url(), "http://emby.local:8920");

        config.use_ssl = true;
        assert_eq!(config.base_url(), "https://emby.local:8920");
    }

    #[test]
    fn zero_durations_are_clamped() {
        let config = Config {
            scan_interval_secs: 0,
            timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.scan_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
