use serde::{Deserialize, Serialize};

use crate::emby_client::DEFAULT_ACTIVITY_LIMIT;

/// Configuration for the Emby monitor application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub use_ssl: bool,

    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_activity_limit")]
    pub activity_limit: u32,

    #[serde(default)]
    pub monitored_devices: Vec<MonitoredDevice>,
}

/// A client device selected by the operator for dedicated per-device views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredDevice {
    pub device_id: String,
    pub device_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub app_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: String::new(),
            use_ssl: false,
            scan_interval_secs: default_scan_interval(),
            timeout_secs: default_timeout(),
            activity_limit: default_activity_limit(),
            monitored_devices: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8096
}

fn default_scan_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    10
}

fn default_activity_limit() -> u32 {
    DEFAULT_ACTIVITY_LIMIT
}
