use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::emby_client::helpers::deserialize_id_string;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SystemInfo {
    pub server_name: Option<String>,
    pub version: Option<String>,
    pub id: Option<String>,
    pub operating_system: Option<String>,
    pub has_pending_restart: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SystemInfo {
    pub fn is_empty(&self) -> bool {
        self.server_name.is_none()
            && self.version.is_none()
            && self.id.is_none()
            && self.operating_system.is_none()
            && !self.has_pending_restart
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PublicSystemInfo {
    pub server_name: Option<String>,
    pub version: Option<String>,
    pub id: Option<String>,
    pub local_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EndpointInfo {
    pub is_local: Option<bool>,
    pub is_in_network: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EndpointInfo {
    pub fn is_empty(&self) -> bool {
        self.is_local.is_none() && self.is_in_network.is_none() && self.extra.is_empty()
    }
}

/// Library totals keyed by media kind (`MovieCount`, `SeriesCount`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ItemCounts(BTreeMap<String, i64>);

impl From<Map<String, Value>> for ItemCounts {
    fn from(raw: Map<String, Value>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(kind, value)| value.as_i64().map(|count| (kind, count)))
                .collect(),
        )
    }
}

impl ItemCounts {
    pub fn get(&self, kind: &str) -> i64 {
        self.0.get(kind).copied().unwrap_or(0)
    }

    pub fn movies(&self) -> i64 {
        self.get("MovieCount")
    }

    pub fn series(&self) -> i64 {
        self.get("SeriesCount")
    }

    pub fn episodes(&self) -> i64 {
        self.get("EpisodeCount")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(kind, count)| (kind.as_str(), *count))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LibraryFolder {
    pub name: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "Type")]
    pub folder_type: Option<String>,
    pub collection_type: Option<String>,
    pub date_created: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    pub name: Option<String>,
    pub id: Option<String>,
    pub has_password: bool,
    pub last_login_date: Option<String>,
    pub last_activity_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ActivityEntry {
    #[serde(deserialize_with = "deserialize_id_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub entry_type: Option<String>,
    pub date: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub severity: Option<String>,
    pub short_overview: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    #[default]
    Idle,
    Running,
    Cancelling,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScheduledTask {
    pub name: Option<String>,
    pub id: Option<String>,
    pub state: TaskState,
    pub category: Option<String>,
    pub description: Option<String>,
    pub current_progress_percentage: Option<f64>,
    pub last_execution_result: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Device {
    pub id: Option<String>,
    pub name: Option<String>,
    pub reported_device_id: Option<String>,
    pub last_user_name: Option<String>,
    pub app_name: Option<String>,
    pub app_version: Option<String>,
    pub date_last_activity: Option<String>,
    pub ip_address: Option<String>,
}
