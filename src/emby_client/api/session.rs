use serde::{Deserialize, Serialize};

use crate::emby_client::helpers::{deserialize_id_string, deserialize_non_empty};

/// One client connection as reported by `/Sessions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Session {
    pub id: Option<String>,
    pub client: Option<String>,
    pub device_name: Option<String>,
    pub device_id: Option<String>,
    /// Arrives as a number on most server versions; kept in string form.
    #[serde(deserialize_with = "deserialize_id_string")]
    pub internal_device_id: Option<String>,
    pub user_name: Option<String>,
    pub user_id: Option<String>,
    pub application_version: Option<String>,
    pub last_activity_date: Option<String>,
    pub remote_end_point: Option<String>,
    pub play_state: PlayState,
    #[serde(deserialize_with = "deserialize_non_empty")]
    pub now_playing_item: Option<NowPlayingItem>,
}

impl Session {
    pub fn is_playing(&self) -> bool {
        self.now_playing_item.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlayState {
    pub position_ticks: Option<i64>,
    pub is_paused: bool,
    pub is_muted: bool,
    pub can_seek: bool,
    pub audio_stream_index: Option<i32>,
    pub subtitle_stream_index: Option<i32>,
    pub repeat_mode: Option<String>,
    pub play_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NowPlayingItem {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "Type")]
    pub item_type: Option<String>,
    pub media_type: Option<String>,
    pub series_name: Option<String>,
    pub parent_index_number: Option<i32>,
    pub index_number: Option<i32>,
    pub production_year: Option<i32>,
    pub run_time_ticks: Option<i64>,
    pub media_streams: Vec<MediaStream>,
}

impl NowPlayingItem {
    pub fn is_episode(&self) -> bool {
        self.item_type.as_deref() == Some("Episode")
    }

    pub fn is_movie(&self) -> bool {
        self.item_type.as_deref() == Some("Movie")
    }

    pub fn streams_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a MediaStream> + 'a {
        self.media_streams
            .iter()
            .filter(move |stream| stream.stream_type.as_deref() == Some(kind))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MediaStream {
    pub index: Option<i32>,
    #[serde(rename = "Type")]
    pub stream_type: Option<String>,
    pub language: Option<String>,
    pub display_language: Option<String>,
    pub display_title: Option<String>,
    pub codec: Option<String>,
    pub channels: Option<i32>,
    pub channel_layout: Option<String>,
    pub bit_rate: Option<i64>,
    pub sample_rate: Option<i64>,
    pub is_default: bool,
    pub is_forced: bool,
    pub is_external: bool,
}

impl MediaStream {
    pub fn language_label(&self) -> &str {
        self.display_language
            .as_deref()
            .or(self.language.as_deref())
            .unwrap_or("Unknown")
    }
}
