use serde::Serialize;

use crate::emby_client::api::Session;
use crate::emby_client::helpers::{progress_percent, ticks_to_seconds};

/// Position figures for a session's current item, in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackProgress {
    pub position_seconds: i64,
    pub duration_seconds: i64,
    pub remaining_seconds: i64,
    pub percent: i64,
}

impl PlaybackProgress {
    /// `None` when the session isn't playing anything.
    pub fn from_session(session: &Session) -> Option<Self> {
        let item = session.now_playing_item.as_ref()?;
        let position_ticks = session.play_state.position_ticks.unwrap_or(0).max(0);
        let runtime_ticks = item.run_time_ticks.unwrap_or(0).max(0);
        Some(Self::from_ticks(position_ticks, runtime_ticks))
    }

    pub fn from_ticks(position_ticks: i64, runtime_ticks: i64) -> Self {
        let remaining_ticks = runtime_ticks.saturating_sub(position_ticks).max(0);
        Self {
            position_seconds: ticks_to_seconds(position_ticks),
            duration_seconds: ticks_to_seconds(runtime_ticks),
            remaining_seconds: ticks_to_seconds(remaining_ticks),
            percent: progress_percent(position_ticks, runtime_ticks),
        }
    }
}
