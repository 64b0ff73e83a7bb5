use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const TOKEN_HEADER: &str = "X-Emby-Token";

pub const SYSTEM_INFO_PATH: &str = "/System/Info";
pub const PUBLIC_SYSTEM_INFO_PATH: &str = "/System/Info/Public";
pub const ENDPOINT_INFO_PATH: &str = "/System/Endpoint";
pub const ITEMS_COUNTS_PATH: &str = "/Items/Counts";
pub const LIBRARY_FOLDERS_PATH: &str = "/Library/MediaFolders";
pub const SESSIONS_PATH: &str = "/Sessions";
pub const USERS_PATH: &str = "/Users";
pub const ACTIVITY_LOG_PATH: &str = "/System/ActivityLog/Entries";
pub const SCHEDULED_TASKS_PATH: &str = "/ScheduledTasks";
pub const DEVICES_PATH: &str = "/Devices";

pub const DEFAULT_ACTIVITY_LIMIT: u32 = 10;

/// Emby reports positions and runtimes in 100ns ticks.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Whole seconds in `ticks`, rounded down. Negative inputs count as zero.
pub fn ticks_to_seconds(ticks: i64) -> i64 {
    ticks.max(0) / TICKS_PER_SECOND
}

/// Integer percentage of `position` within `runtime`, rounded down.
/// A zero or negative runtime yields 0.
pub fn progress_percent(position_ticks: i64, runtime_ticks: i64) -> i64 {
    if runtime_ticks <= 0 {
        return 0;
    }
    let position = i128::from(position_ticks.max(0));
    i64::try_from(position * 100 / i128::from(runtime_ticks)).unwrap_or(i64::MAX)
}

/// `MM:SS` below one hour, `HH:MM:SS` above.
pub fn format_clock(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Parse an Emby timestamp. Values without an offset are taken as UTC.
pub fn parse_emby_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Accepts a JSON string or number and keeps it as a string.
pub fn deserialize_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

/// Treats an object carrying none of the known fields (`{}`) as absent.
pub fn deserialize_non_empty<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default + PartialEq,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.filter(|inner| *inner != T::default()))
}

/// Sequence endpoints answer either with a bare array or with an
/// `{"Items": [...], "TotalRecordCount": n}` query result.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ItemList<T> {
    Bare(Vec<T>),
    Envelope {
        #[serde(rename = "Items", default = "Vec::new")]
        items: Vec<T>,
    },
}

impl<T> ItemList<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ItemList::Bare(items) | ItemList::Envelope { items } => items,
        }
    }
}
