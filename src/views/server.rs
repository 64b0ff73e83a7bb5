use std::sync::Arc;

use chrono::Local;
use serde_json::{json, Value};

use crate::coordinator::SnapshotCoordinator;
use crate::emby_client::{Snapshot, TaskState};

use super::activity::{estimated_watch_minutes, playbacks_today, recently_added};
use super::descriptor::{SensorDescriptor, SensorReading, SensorValue};

const LIBRARY_TASK_KEYWORDS: [&str; 4] = ["Library", "Scan", "库", "扫描"];

pub static SERVER_SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor {
        key: "version",
        name: "Version",
        icon: "mdi:tag",
        unit: None,
        always_available: false,
        value: version,
        attributes: Some(version_attributes),
    },
    SensorDescriptor {
        key: "server_name",
        name: "Server Name",
        icon: "mdi:server",
        unit: None,
        always_available: false,
        value: server_name,
        attributes: None,
    },
    SensorDescriptor {
        key: "movie_count",
        name: "Movies",
        icon: "mdi:movie",
        unit: None,
        always_available: false,
        value: |s| Some(s.items_counts.movies().into()),
        attributes: None,
    },
    SensorDescriptor {
        key: "series_count",
        name: "Series",
        icon: "mdi:television",
        unit: None,
        always_available: false,
        value: |s| Some(s.items_counts.series().into()),
        attributes: None,
    },
    SensorDescriptor {
        key: "episode_count",
        name: "Episodes",
        icon: "mdi:play-box-multiple",
        unit: None,
        always_available: false,
        value: |s| Some(s.items_counts.episodes().into()),
        attributes: None,
    },
    SensorDescriptor {
        key: "total_items",
        name: "Total Items",
        icon: "mdi:sigma",
        unit: None,
        always_available: false,
        value: total_items,
        attributes: Some(count_attributes),
    },
    SensorDescriptor {
        key: "library_folders",
        name: "Library Folders",
        icon: "mdi:folder-multiple",
        unit: None,
        always_available: false,
        value: |s| Some(s.library_folders.len().into()),
        attributes: Some(folder_attributes),
    },
    SensorDescriptor {
        key: "total_users",
        name: "Users",
        icon: "mdi:account-multiple",
        unit: None,
        always_available: false,
        value: |s| Some(s.users.len().into()),
        attributes: Some(user_attributes),
    },
    SensorDescriptor {
        key: "active_sessions",
        name: "Active Sessions",
        icon: "mdi:monitor-multiple",
        unit: None,
        always_available: false,
        value: |s| Some(s.sessions.len().into()),
        attributes: Some(session_attributes),
    },
    SensorDescriptor {
        key: "device_count",
        name: "Devices",
        icon: "mdi:devices",
        unit: None,
        always_available: false,
        value: |s| Some(s.devices.len().into()),
        attributes: Some(device_attributes),
    },
    SensorDescriptor {
        key: "recent_activities",
        name: "Recent Activities",
        icon: "mdi:history",
        unit: None,
        always_available: false,
        value: |s| Some(s.activity_log.len().into()),
        attributes: Some(activity_attributes),
    },
    SensorDescriptor {
        key: "scheduled_tasks",
        name: "Scheduled Tasks",
        icon: "mdi:calendar-clock",
        unit: None,
        always_available: false,
        value: |s| Some(s.scheduled_tasks.len().into()),
        attributes: Some(task_attributes),
    },
    SensorDescriptor {
        key: "today_play_count",
        name: "Plays Today",
        icon: "mdi:play-circle-outline",
        unit: None,
        always_available: false,
        value: |s| Some(playbacks_today(&s.activity_log, &Local::now()).len().into()),
        attributes: Some(today_play_attributes),
    },
    SensorDescriptor {
        key: "today_watch_time",
        name: "Watch Time Today",
        icon: "mdi:clock-outline",
        unit: Some("min"),
        always_available: false,
        value: today_watch_time,
        attributes: Some(today_watch_attributes),
    },
    SensorDescriptor {
        key: "recently_added",
        name: "Recently Added",
        icon: "mdi:new-box",
        unit: None,
        always_available: false,
        value: latest_addition,
        attributes: Some(recently_added_attributes),
    },
];

pub static BINARY_SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor {
        key: "online",
        name: "Online",
        icon: "mdi:check-network",
        unit: None,
        always_available: true,
        value: |s| Some(s.server_name().is_some_and(|name| !name.is_empty()).into()),
        attributes: None,
    },
    SensorDescriptor {
        key: "has_active_streams",
        name: "Active Streams",
        icon: "mdi:play-circle",
        unit: None,
        always_available: false,
        value: |s| Some(s.playing_sessions().next().is_some().into()),
        attributes: Some(stream_attributes),
    },
    SensorDescriptor {
        key: "tasks_running",
        name: "Tasks Running",
        icon: "mdi:calendar-clock",
        unit: None,
        always_available: false,
        value: |s| {
            let running = s
                .scheduled_tasks
                .iter()
                .any(|task| task.state == TaskState::Running);
            Some(running.into())
        },
        attributes: Some(running_task_attributes),
    },
    SensorDescriptor {
        key: "pending_restart",
        name: "Pending Restart",
        icon: "mdi:restart",
        unit: None,
        always_available: false,
        value: |s| Some(s.system_info.has_pending_restart.into()),
        attributes: None,
    },
    SensorDescriptor {
        key: "is_in_network",
        name: "In Network",
        icon: "mdi:lan",
        unit: None,
        always_available: false,
        value: |s| Some(s.endpoint_info.is_in_network.unwrap_or(false).into()),
        attributes: Some(network_attributes),
    },
    SensorDescriptor {
        key: "library_scanning",
        name: "Library Scanning",
        icon: "mdi:folder-multiple",
        unit: None,
        always_available: false,
        value: |s| Some(s.scheduled_tasks.iter().any(is_library_scan).into()),
        attributes: Some(scan_attributes),
    },
];

/// Reads server-wide sensors from the coordinator's current snapshot.
#[derive(Clone)]
pub struct ServerView {
    coordinator: Arc<SnapshotCoordinator>,
}

impl ServerView {
    pub fn new(coordinator: Arc<SnapshotCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn read(&self, descriptor: &SensorDescriptor) -> SensorReading {
        let state = self.coordinator.state();
        let fallback = Snapshot::default();
        let source = match state.snapshot.as_deref() {
            Some(snapshot) if state.is_available() => Some(snapshot),
            // Stale data would report the server as online after it went away.
            _ if descriptor.always_available => Some(&fallback),
            _ => None,
        };

        let (value, attributes) = match source {
            Some(snapshot) => (
                (descriptor.value)(snapshot),
                descriptor
                    .attributes
                    .map(|attributes| attributes(snapshot))
                    .unwrap_or(Value::Null),
            ),
            None => (None, Value::Null),
        };

        SensorReading {
            key: descriptor.key.to_string(),
            name: format!("Emby {}", descriptor.name),
            icon: descriptor.icon,
            unit: descriptor.unit,
            available: source.is_some(),
            value,
            attributes,
        }
    }

    /// Every server and binary sensor, in table order.
    pub fn readings(&self) -> Vec<SensorReading> {
        SERVER_SENSORS
            .iter()
            .chain(BINARY_SENSORS.iter())
            .map(|descriptor| self.read(descriptor))
            .collect()
    }
}

pub fn find_sensor(key: &str) -> Option<&'static SensorDescriptor> {
    SERVER_SENSORS
        .iter()
        .chain(BINARY_SENSORS.iter())
        .find(|descriptor| descriptor.key == key)
}

fn version(s: &Snapshot) -> Option<SensorValue> {
    s.system_info.version.as_deref().map(SensorValue::from)
}

fn server_name(s: &Snapshot) -> Option<SensorValue> {
    s.server_name().map(SensorValue::from)
}

fn total_items(s: &Snapshot) -> Option<SensorValue> {
    let counts = &s.items_counts;
    Some((counts.movies() + counts.series() + counts.episodes()).into())
}

fn today_watch_time(s: &Snapshot) -> Option<SensorValue> {
    let plays = playbacks_today(&s.activity_log, &Local::now()).len();
    Some(estimated_watch_minutes(plays).into())
}

fn latest_addition(s: &Snapshot) -> Option<SensorValue> {
    let added = recently_added(&s.activity_log, &Local::now());
    let name = added
        .first()
        .map(|(_, entry)| entry.name.as_deref().unwrap_or("Unknown"))
        .unwrap_or("None");
    Some(name.into())
}

fn is_library_scan(task: &crate::emby_client::ScheduledTask) -> bool {
    task.state == TaskState::Running
        && task.name.as_deref().is_some_and(|name| {
            LIBRARY_TASK_KEYWORDS
                .iter()
                .any(|keyword| name.contains(keyword))
        })
}

fn version_attributes(s: &Snapshot) -> Value {
    json!({
        "server_id": s.system_info.id,
        "operating_system": s.system_info.operating_system,
    })
}

fn count_attributes(s: &Snapshot) -> Value {
    let counts = &s.items_counts;
    json!({
        "movie_count": counts.movies(),
        "series_count": counts.series(),
        "episode_count": counts.episodes(),
        "game_count": counts.get("GameCount"),
        "artist_count": counts.get("ArtistCount"),
        "song_count": counts.get("SongCount"),
        "album_count": counts.get("AlbumCount"),
    })
}

fn folder_attributes(s: &Snapshot) -> Value {
    let folders: Vec<Value> = s
        .library_folders
        .iter()
        .map(|folder| json!({ "name": folder.name, "id": folder.id, "type": folder.folder_type }))
        .collect();
    json!({ "folders": folders })
}

fn user_attributes(s: &Snapshot) -> Value {
    let users: Vec<Value> = s
        .users
        .iter()
        .map(|user| json!({ "name": user.name, "id": user.id, "last_login": user.last_login_date }))
        .collect();
    json!({ "users": users })
}

fn session_attributes(s: &Snapshot) -> Value {
    let sessions: Vec<Value> = s
        .sessions
        .iter()
        .map(|session| {
            json!({
                "client": session.client,
                "device": session.device_name,
                "user": session.user_name,
                "id": session.id,
            })
        })
        .collect();
    json!({ "sessions": sessions })
}

fn device_attributes(s: &Snapshot) -> Value {
    let devices: Vec<Value> = s
        .devices
        .iter()
        .map(|device| {
            json!({
                "name": device.name,
                "app": device.app_name,
                "last_activity": device.date_last_activity,
            })
        })
        .collect();
    json!({ "devices": devices })
}

fn activity_attributes(s: &Snapshot) -> Value {
    let activities: Vec<Value> = s
        .activity_log
        .iter()
        .map(|entry| {
            json!({
                "name": entry.name,
                "type": entry.entry_type,
                "date": entry.date,
                "severity": entry.severity,
            })
        })
        .collect();
    json!({ "activities": activities })
}

fn task_attributes(s: &Snapshot) -> Value {
    let tasks: Vec<Value> = s
        .scheduled_tasks
        .iter()
        .map(|task| json!({ "name": task.name, "state": task.state, "category": task.category }))
        .collect();
    json!({ "tasks": tasks })
}

fn today_play_attributes(s: &Snapshot) -> Value {
    let playbacks: Vec<Value> = playbacks_today(&s.activity_log, &Local::now())
        .into_iter()
        .take(10)
        .map(|entry| {
            json!({
                "name": entry.name.as_deref().unwrap_or("Unknown"),
                "type": entry.entry_type,
                "user": entry.user_name,
                "date": entry.date,
            })
        })
        .collect();
    json!({ "playbacks": playbacks })
}

fn today_watch_attributes(s: &Snapshot) -> Value {
    let plays = playbacks_today(&s.activity_log, &Local::now()).len();
    let minutes = estimated_watch_minutes(plays);
    json!({
        "playback_count": plays,
        "estimated_hours": minutes / 60,
        "estimated_minutes": minutes % 60,
        "formatted_time": format!("{}h {}m", minutes / 60, minutes % 60),
        "estimated": true,
    })
}

fn recently_added_attributes(s: &Snapshot) -> Value {
    let added = recently_added(&s.activity_log, &Local::now());
    let items: Vec<Value> = added
        .iter()
        .take(20)
        .map(|(_, entry)| {
            json!({
                "name": entry.name.as_deref().unwrap_or("Unknown"),
                "type": entry.entry_type,
                "date": entry.date,
                "severity": entry.severity,
            })
        })
        .collect();
    json!({
        "total_count": added.len(),
        "latest_item": added.first().and_then(|(_, entry)| entry.name.clone()),
        "latest_date": added.first().and_then(|(_, entry)| entry.date.clone()),
        "items": items,
    })
}

fn network_attributes(s: &Snapshot) -> Value {
    json!({ "is_local": s.endpoint_info.is_local.unwrap_or(false) })
}

fn stream_attributes(s: &Snapshot) -> Value {
    let streams: Vec<Value> = s
        .playing_sessions()
        .filter_map(|session| {
            let item = session.now_playing_item.as_ref()?;
            Some(json!({
                "client": session.client,
                "device": session.device_name,
                "user": session.user_name,
                "content": item.name,
                "type": item.item_type,
                "paused": session.play_state.is_paused,
            }))
        })
        .collect();
    json!({ "active_count": streams.len(), "streams": streams })
}

fn running_task_attributes(s: &Snapshot) -> Value {
    let running: Vec<Value> = s
        .scheduled_tasks
        .iter()
        .filter(|task| task.state == TaskState::Running)
        .map(|task| json!({ "name": task.name, "category": task.category }))
        .collect();
    json!({ "running_tasks": running })
}

fn scan_attributes(s: &Snapshot) -> Value {
    let scanning: Vec<Value> = s
        .scheduled_tasks
        .iter()
        .filter(|task| is_library_scan(task))
        .map(|task| {
            json!({
                "name": task.name,
                "category": task.category,
                "current_progress": task.current_progress_percentage,
            })
        })
        .collect();
    json!({ "scanning_tasks": scanning })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::coordinator::DashboardSource;
    use crate::emby_client::{ScheduledTask, SystemInfo};
    use crate::types::EmbyError;

    struct Outcomes(Mutex<VecDeque<Result<Snapshot, EmbyError>>>);

    #[async_trait]
    impl DashboardSource for Outcomes {
        async fn fetch_snapshot(&self) -> Result<Snapshot, EmbyError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(EmbyError::Auth))
        }
    }

    fn view(outcomes: Vec<Result<Snapshot, EmbyError>>) -> (ServerView, Arc<SnapshotCoordinator>) {
        let source = Arc::new(Outcomes(Mutex::new(outcomes.into())));
        let coordinator = Arc::new(SnapshotCoordinator::new(source, Duration::from_secs(30)));
        (ServerView::new(Arc::clone(&coordinator)), coordinator)
    }

    fn home() -> Snapshot {
        Snapshot {
            system_info: SystemInfo {
                server_name: Some("Home".to_string()),
                version: Some("4.8.0.0".to_string()),
                ..Default::default()
            },
            items_counts: serde_json::from_value(json!({
                "MovieCount": 120,
                "SeriesCount": 8,
                "EpisodeCount": 310
            }))
            .unwrap(),
            scheduled_tasks: vec![
                ScheduledTask {
                    name: Some("Scan media library".to_string()),
                    state: TaskState::Running,
                    ..Default::default()
                },
                ScheduledTask {
                    name: Some("Cleanup".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn read(view: &ServerView, key: &str) -> SensorReading {
        view.read(find_sensor(key).unwrap())
    }

    #[tokio::test]
    async fn only_online_is_reported_before_first_refresh() {
        let (view, _) = view(Vec::new());

        let version = read(&view, "version");
        assert!(!version.available);
        assert_eq!(version.value, None);

        let online = read(&view, "online");
        assert!(online.available);
        assert_eq!(online.value, Some(SensorValue::Bool(false)));
    }

    #[tokio::test]
    async fn values_come_from_the_latest_snapshot() {
        let (view, coordinator) = view(vec![Ok(home())]);
        assert!(coordinator.request_refresh().await);

        assert_eq!(read(&view, "total_items").value, Some(SensorValue::Int(438)));
        assert_eq!(
            read(&view, "version").value,
            Some(SensorValue::Text("4.8.0.0".to_string()))
        );
        assert_eq!(read(&view, "online").value, Some(SensorValue::Bool(true)));
        assert_eq!(read(&view, "tasks_running").value, Some(SensorValue::Bool(true)));
        assert_eq!(read(&view, "library_scanning").value, Some(SensorValue::Bool(true)));
        assert_eq!(
            read(&view, "recently_added").value,
            Some(SensorValue::Text("None".to_string()))
        );

        let watch_time = read(&view, "today_watch_time");
        assert_eq!(watch_time.unit, Some("min"));
        assert_eq!(watch_time.attributes["estimated"], json!(true));

        let readings = view.readings();
        assert_eq!(readings.len(), SERVER_SENSORS.len() + BINARY_SENSORS.len());
        assert!(readings.iter().all(|reading| reading.available));
    }

    #[tokio::test]
    async fn failed_refresh_marks_server_offline() {
        let (view, coordinator) = view(vec![Ok(home()), Err(EmbyError::Auth)]);
        coordinator.request_refresh().await;
        coordinator.request_refresh().await;

        assert!(!read(&view, "movie_count").available);
        let online = read(&view, "online");
        assert!(online.available);
        assert_eq!(online.value, Some(SensorValue::Bool(false)));
    }
}
