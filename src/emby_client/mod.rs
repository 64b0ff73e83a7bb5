mod api;
mod client;
mod core;
mod helpers;
mod models;

pub use api::{
    ActivityEntry, DashboardResults, Device, EndpointInfo, ItemCounts, LibraryFolder,
    MediaStream, NowPlayingItem, PlayState, PublicSystemInfo, ScheduledTask, SectionResult,
    Session, SystemInfo, TaskState, User,
};
pub use client::EmbyClient;
pub use helpers::{
    format_clock, parse_emby_date, progress_percent, ticks_to_seconds, DEFAULT_ACTIVITY_LIMIT,
    TICKS_PER_SECOND,
};
pub use models::{PlaybackProgress, Snapshot};
