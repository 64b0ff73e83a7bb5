//! Per-device sensors and the media-player view of one monitored device.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::MonitoredDevice;
use crate::coordinator::SnapshotCoordinator;
use crate::emby_client::{
    format_clock, ticks_to_seconds, EmbyClient, NowPlayingItem, PlaybackProgress, Session,
    Snapshot,
};

use super::descriptor::{DeviceContext, DeviceSensorDescriptor, SensorReading, SensorValue};
use super::matching::{session_matches, ALL_DEVICES};
use super::tracks::{audio_attributes, audio_label, subtitle_attributes, subtitle_label};

const DEFAULT_MODEL: &str = "Emby Client";
const NO_PLAYBACK: &str = "No active playback";

pub static DEVICE_SENSORS: &[DeviceSensorDescriptor] = &[
    DeviceSensorDescriptor {
        key: "now_playing",
        name: "Now Playing",
        icon: "mdi:play",
        unit: None,
        value: now_playing,
        attributes: Some(now_playing_attributes),
    },
    DeviceSensorDescriptor {
        key: "playback_state",
        name: "Playback State",
        icon: "mdi:play-pause",
        unit: None,
        value: |session| playback_state(session).label().into(),
        attributes: Some(playback_state_attributes),
    },
    DeviceSensorDescriptor {
        key: "progress_percent",
        name: "Progress",
        icon: "mdi:progress-clock",
        unit: Some("%"),
        value: |session| progress(session).percent.into(),
        attributes: Some(progress_attributes),
    },
    DeviceSensorDescriptor {
        key: "playback_position",
        name: "Position",
        icon: "mdi:timer-outline",
        unit: None,
        value: |session| format_clock(progress(session).position_seconds).into(),
        attributes: Some(position_attributes),
    },
    DeviceSensorDescriptor {
        key: "playback_remaining",
        name: "Remaining",
        icon: "mdi:timer-sand",
        unit: None,
        value: |session| format_clock(progress(session).remaining_seconds).into(),
        attributes: Some(remaining_attributes),
    },
    DeviceSensorDescriptor {
        key: "media_type",
        name: "Media Type",
        icon: "mdi:filmstrip",
        unit: None,
        value: |session| {
            playing_item(session)
                .and_then(|item| item.item_type.as_deref())
                .unwrap_or("None")
                .into()
        },
        attributes: Some(media_type_attributes),
    },
    DeviceSensorDescriptor {
        key: "media_title",
        name: "Media Title",
        icon: "mdi:play",
        unit: None,
        value: media_title,
        attributes: None,
    },
    DeviceSensorDescriptor {
        key: "audio_track",
        name: "Audio Track",
        icon: "mdi:volume-high",
        unit: None,
        value: audio_track,
        attributes: Some(audio_track_attributes),
    },
    DeviceSensorDescriptor {
        key: "subtitle_track",
        name: "Subtitle Track",
        icon: "mdi:subtitles",
        unit: None,
        value: subtitle_track,
        attributes: Some(subtitle_track_attributes),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Idle,
    Playing,
    Paused,
}

impl PlayerState {
    pub fn label(self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Playing => "Playing",
            PlayerState::Paused => "Paused",
        }
    }
}

/// What a media-player card shows for one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub state: PlayerState,
    pub content_type: Option<&'static str>,
    pub title: Option<String>,
    pub series_title: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
    pub duration_seconds: Option<i64>,
    pub position_seconds: Option<i64>,
    pub image_url: Option<String>,
    /// Identity (live or cached) and raw session flags.
    pub attributes: Value,
}

/// One monitored device, read through the shared coordinator.
///
/// Identity strings are cached from the last matching session so the
/// device keeps a sensible name while it is offline.
pub struct DeviceView {
    coordinator: Arc<SnapshotCoordinator>,
    device: MonitoredDevice,
    cached_user: Option<String>,
    cached_device: Option<String>,
    cached_client: Option<String>,
}

impl DeviceView {
    pub fn new(coordinator: Arc<SnapshotCoordinator>, device: MonitoredDevice) -> Self {
        Self {
            coordinator,
            device,
            cached_user: None,
            cached_device: None,
            cached_client: None,
        }
    }

    pub fn device(&self) -> &MonitoredDevice {
        &self.device
    }

    pub fn is_available(&self) -> bool {
        self.coordinator.is_available()
    }

    /// Refresh the cached identity from the current snapshot.
    pub fn sync(&mut self) {
        let Some(snapshot) = self.live_snapshot() else {
            return;
        };
        let Some(session) = self.matching_session(&snapshot) else {
            debug!(device_id = %self.device.device_id, "No matching session");
            return;
        };

        if let Some(user) = session.user_name.clone() {
            self.cached_user = Some(user);
        }
        if let Some(device) = session.device_name.clone() {
            self.cached_device = Some(device);
        }
        if let Some(client) = session.client.clone() {
            self.cached_client = Some(client);
        }
    }

    pub fn display_name(&self) -> String {
        let user = self
            .cached_user
            .as_deref()
            .or_else(|| non_empty(&self.device.user_name))
            .unwrap_or("Unknown");
        let device = self
            .cached_device
            .as_deref()
            .or_else(|| non_empty(&self.device.device_name))
            .unwrap_or(&self.device.device_id);
        format!("Emby {user} - {device}")
    }

    pub fn model(&self) -> &str {
        self.cached_client
            .as_deref()
            .or_else(|| non_empty(&self.device.app_name))
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn read(&self, descriptor: &DeviceSensorDescriptor) -> SensorReading {
        let live = self.live_snapshot().map(|snapshot| {
            let context = self.context(&snapshot);
            let value = (descriptor.value)(context.active());
            let attributes = descriptor
                .attributes
                .map(|build| build(&context))
                .unwrap_or(Value::Null);
            (value, attributes)
        });
        let (value, attributes) = match live {
            Some((value, attributes)) => (Some(value), attributes),
            None => (None, Value::Null),
        };

        SensorReading {
            key: format!("{}_{}", self.device.device_id, descriptor.key),
            name: format!("{} {}", self.display_name(), descriptor.name),
            icon: descriptor.icon,
            unit: descriptor.unit,
            available: value.is_some(),
            value,
            attributes,
        }
    }

    pub fn readings(&self) -> Vec<SensorReading> {
        DEVICE_SENSORS
            .iter()
            .map(|descriptor| self.read(descriptor))
            .collect()
    }

    /// Player state from the first session on this device, playing or not.
    /// `None` while the coordinator is unavailable.
    pub fn player(&self, client: &EmbyClient) -> Option<PlayerView> {
        let snapshot = self.live_snapshot()?;
        let session = self.matching_session(&snapshot);
        let item = session.and_then(|session| session.now_playing_item.as_ref());
        let episode = item.filter(|item| item.is_episode());

        let name = match session {
            Some(session) => format!(
                "Emby {} - {}",
                session
                    .user_name
                    .as_deref()
                    .or(self.cached_user.as_deref())
                    .unwrap_or("Unknown"),
                session
                    .device_name
                    .as_deref()
                    .or(self.cached_device.as_deref())
                    .unwrap_or(&self.device.device_id),
            ),
            None => self.display_name(),
        };

        Some(PlayerView {
            name,
            state: playback_state(session),
            content_type: item.and_then(content_type),
            title: item.and_then(|item| item.name.clone()),
            series_title: episode.and_then(|item| item.series_name.clone()),
            season: episode
                .and_then(|item| item.parent_index_number)
                .filter(|season| *season > 0)
                .map(|season| format!("S{season}")),
            episode: episode
                .and_then(|item| item.index_number)
                .filter(|number| *number > 0)
                .map(|number| format!("E{number}")),
            duration_seconds: item
                .and_then(|item| item.run_time_ticks)
                .filter(|ticks| *ticks > 0)
                .map(ticks_to_seconds),
            position_seconds: session
                .filter(|session| session.is_playing())
                .and_then(|session| session.play_state.position_ticks)
                .filter(|ticks| *ticks > 0)
                .map(ticks_to_seconds),
            image_url: item
                .and_then(|item| item.id.as_deref())
                .map(|id| client.primary_image_url(id)),
            attributes: self.player_attributes(session),
        })
    }

    fn player_attributes(&self, session: Option<&Session>) -> Value {
        let mut attributes = json!({
            "device_id": self.device.device_id,
            "client": live_or_cached(
                session.and_then(|s| s.client.as_ref()),
                &self.cached_client,
            ),
            "device_name": live_or_cached(
                session.and_then(|s| s.device_name.as_ref()),
                &self.cached_device,
            ),
            "user_name": live_or_cached(
                session.and_then(|s| s.user_name.as_ref()),
                &self.cached_user,
            ),
        });

        let Some(session) = session else {
            attributes["status"] = json!(PlayerState::Idle.label());
            return attributes;
        };
        let play_state = &session.play_state;
        attributes["session_id"] = json!(session.id);
        attributes["remote_endpoint"] = json!(session.remote_end_point);
        attributes["is_muted"] = json!(play_state.is_muted);
        attributes["can_seek"] = json!(play_state.can_seek);
        attributes["repeat_mode"] = json!(play_state.repeat_mode);

        if let Some(item) = session.now_playing_item.as_ref() {
            attributes["media_type"] = json!(item.item_type);
            attributes["media_id"] = json!(item.id);
            attributes["production_year"] = json!(item.production_year);
        }
        attributes
    }

    fn context<'a>(&'a self, snapshot: &'a Snapshot) -> DeviceContext<'a> {
        let device_id = self.device.device_id.as_str();
        DeviceContext {
            device_id,
            playing: snapshot
                .sessions
                .iter()
                .filter(|session| session_matches(session, Some(device_id)))
                .filter(|session| session.is_playing())
                .collect(),
        }
    }

    fn live_snapshot(&self) -> Option<Arc<Snapshot>> {
        if !self.coordinator.is_available() {
            return None;
        }
        self.coordinator.current_snapshot()
    }

    fn matching_session<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a Session> {
        snapshot
            .sessions
            .iter()
            .find(|session| session_matches(session, Some(self.device.device_id.as_str())))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|value| !value.is_empty())
}

fn live_or_cached(live: Option<&String>, cached: &Option<String>) -> Option<String> {
    live.or(cached.as_ref()).cloned()
}

fn playing_item(session: Option<&Session>) -> Option<&NowPlayingItem> {
    session.and_then(|session| session.now_playing_item.as_ref())
}

fn progress(session: Option<&Session>) -> PlaybackProgress {
    session
        .and_then(PlaybackProgress::from_session)
        .unwrap_or_default()
}

fn playback_state(session: Option<&Session>) -> PlayerState {
    match session {
        Some(session) if session.is_playing() => {
            if session.play_state.is_paused {
                PlayerState::Paused
            } else {
                PlayerState::Playing
            }
        }
        _ => PlayerState::Idle,
    }
}

/// `S01E02` when both numbers are known.
fn episode_code(item: &NowPlayingItem) -> Option<String> {
    let season = item.parent_index_number.filter(|n| *n > 0)?;
    let episode = item.index_number.filter(|n| *n > 0)?;
    Some(format!("S{season:02}E{episode:02}"))
}

fn series_heading(item: &NowPlayingItem) -> Option<String> {
    if !item.is_episode() {
        return None;
    }
    let series = item.series_name.as_deref().filter(|name| !name.is_empty())?;
    Some(format!("{series} {}", episode_code(item)?))
}

fn now_playing(session: Option<&Session>) -> SensorValue {
    let Some(item) = playing_item(session) else {
        return "Nothing playing".into();
    };
    series_heading(item)
        .unwrap_or_else(|| item.name.clone().unwrap_or_else(|| "Unknown".to_string()))
        .into()
}

fn media_title(session: Option<&Session>) -> SensorValue {
    let Some(item) = playing_item(session) else {
        return "None".into();
    };
    let name = item.name.as_deref().unwrap_or("Unknown");
    match series_heading(item) {
        Some(heading) => format!("{heading} - {name}").into(),
        None => name.into(),
    }
}

fn audio_track(session: Option<&Session>) -> SensorValue {
    match session.zip(playing_item(session)) {
        Some((session, item)) => audio_label(item, &session.play_state).into(),
        None => "None".into(),
    }
}

fn subtitle_track(session: Option<&Session>) -> SensorValue {
    match session.zip(playing_item(session)) {
        Some((session, item)) => subtitle_label(item, &session.play_state).into(),
        None => "None".into(),
    }
}

fn idle_attributes() -> Value {
    json!({ "status": NO_PLAYBACK })
}

fn with_active(
    context: &DeviceContext<'_>,
    build: impl FnOnce(&Session, &NowPlayingItem) -> Value,
) -> Value {
    let active = context.active();
    match active.zip(playing_item(active)) {
        Some((session, item)) => build(session, item),
        None => idle_attributes(),
    }
}

/// Series numbering for episodes, release year for movies.
fn item_details(item: &NowPlayingItem) -> Map<String, Value> {
    let mut details = Map::new();
    if item.is_episode() {
        details.insert("series_name".into(), json!(item.series_name));
        details.insert("season".into(), json!(item.parent_index_number));
        details.insert("episode".into(), json!(item.index_number));
    } else if item.is_movie() {
        details.insert("year".into(), json!(item.production_year));
    }
    details
}

fn playback_info(session: &Session) -> Option<Value> {
    let item = session.now_playing_item.as_ref()?;
    let progress = PlaybackProgress::from_session(session)?;
    let mut info = Map::new();
    info.insert("media_name".into(), json!(item.name));
    info.insert("media_type".into(), json!(item.item_type));
    info.insert(
        "playback_state".into(),
        json!(playback_state(Some(session)).label()),
    );
    info.insert("is_paused".into(), json!(session.play_state.is_paused));
    info.insert("progress_percent".into(), json!(progress.percent));
    info.insert(
        "user".into(),
        json!(session.user_name.as_deref().unwrap_or("Unknown")),
    );
    info.insert(
        "device".into(),
        json!(session.device_name.as_deref().unwrap_or("Unknown")),
    );
    info.insert(
        "client".into(),
        json!(session.client.as_deref().unwrap_or("Unknown")),
    );
    info.extend(item_details(item));
    if progress.position_seconds > 0 && progress.duration_seconds > 0 {
        let position = progress.position_seconds / 60;
        let duration = progress.duration_seconds / 60;
        info.insert("position_minutes".into(), json!(position));
        info.insert("duration_minutes".into(), json!(duration));
        info.insert("remaining_minutes".into(), json!(duration - position));
    }
    Some(Value::Object(info))
}

fn now_playing_attributes(context: &DeviceContext<'_>) -> Value {
    let playbacks: Vec<Value> = context
        .playing
        .iter()
        .filter_map(|session| playback_info(session))
        .collect();
    let filtered = context.device_id != ALL_DEVICES;

    let mut attributes = Map::new();
    attributes.insert("active_count".into(), json!(playbacks.len()));
    attributes.insert(
        "device_filter".into(),
        json!(if filtered { context.device_id } else { "All devices" }),
    );
    attributes.insert("device_filter_enabled".into(), json!(filtered));

    match playbacks.first() {
        None => {
            attributes.insert("status".into(), json!(NO_PLAYBACK));
        }
        Some(Value::Object(first)) => {
            attributes.extend(first.clone());
            if playbacks.len() > 1 {
                attributes.insert("all_playbacks".into(), json!(playbacks));
            }
        }
        Some(_) => {}
    }
    Value::Object(attributes)
}

fn playback_state_attributes(context: &DeviceContext<'_>) -> Value {
    with_active(context, |session, _| {
        let play_state = &session.play_state;
        json!({
            "is_paused": play_state.is_paused,
            "is_muted": play_state.is_muted,
            "can_seek": play_state.can_seek,
            "device": session.device_name,
            "user": session.user_name,
        })
    })
}

fn progress_attributes(context: &DeviceContext<'_>) -> Value {
    with_active(context, |session, _| {
        let progress = progress(Some(session));
        json!({
            "position_seconds": progress.position_seconds,
            "duration_seconds": progress.duration_seconds,
        })
    })
}

fn position_attributes(context: &DeviceContext<'_>) -> Value {
    with_active(context, |session, _| {
        let seconds = progress(Some(session)).position_seconds;
        json!({ "position_seconds": seconds, "position_minutes": seconds / 60 })
    })
}

fn remaining_attributes(context: &DeviceContext<'_>) -> Value {
    with_active(context, |session, _| {
        let progress = progress(Some(session));
        json!({
            "remaining_seconds": progress.remaining_seconds,
            "remaining_minutes": progress.remaining_seconds / 60,
            "duration_seconds": progress.duration_seconds,
        })
    })
}

fn media_type_attributes(context: &DeviceContext<'_>) -> Value {
    with_active(context, |_, item| {
        let mut attributes = Map::new();
        attributes.insert("original_type".into(), json!(item.item_type));
        attributes.extend(item_details(item));
        Value::Object(attributes)
    })
}

fn audio_track_attributes(context: &DeviceContext<'_>) -> Value {
    with_active(context, |session, item| {
        audio_attributes(item, &session.play_state)
    })
}

fn subtitle_track_attributes(context: &DeviceContext<'_>) -> Value {
    with_active(context, |session, item| {
        subtitle_attributes(item, &session.play_state)
    })
}

fn content_type(item: &NowPlayingItem) -> Option<&'static str> {
    let kind = item.item_type.as_deref()?.to_lowercase();
    match kind.as_str() {
        "movie" | "episode" | "video" => Some("video"),
        "audio" | "music" | "song" => Some("music"),
        _ => None,
    }
}
