//! Read-only views over the coordinator's snapshot.
//!
//! Every value is described by a static descriptor (key, name, unit, icon
//! and a pure extractor) instead of a dedicated type per metric.

mod activity;
mod buttons;
mod descriptor;
mod device;
mod matching;
mod server;
mod tracks;

pub use activity::{
    estimated_watch_minutes, playbacks_today, recently_added, ESTIMATED_MINUTES_PER_PLAYBACK,
    RECENTLY_ADDED_DAYS,
};
pub use buttons::{Button, Buttons};
pub use descriptor::{DeviceSensorDescriptor, SensorDescriptor, SensorReading, SensorValue};
pub use device::{DeviceView, PlayerState, PlayerView, DEVICE_SENSORS};
pub use matching::{active_session, session_matches, ALL_DEVICES};
pub use server::{find_sensor, ServerView, BINARY_SENSORS, SERVER_SENSORS};
pub use tracks::{audio_label, subtitle_label};
