use serde::{Deserialize, Serialize};

use crate::emby_client::api::{
    ActivityEntry, Device, EndpointInfo, ItemCounts, LibraryFolder, ScheduledTask, Session,
    SystemInfo, User,
};

/// Merged result of one polling cycle. Every section is always present;
/// a section whose request failed holds its empty value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub system_info: SystemInfo,
    pub endpoint_info: EndpointInfo,
    pub items_counts: ItemCounts,
    pub library_folders: Vec<LibraryFolder>,
    pub sessions: Vec<Session>,
    pub users: Vec<User>,
    pub activity_log: Vec<ActivityEntry>,
    pub scheduled_tasks: Vec<ScheduledTask>,
    pub devices: Vec<Device>,
}

impl Snapshot {
    pub fn server_name(&self) -> Option<&str> {
        self.system_info.server_name.as_deref()
    }

    /// Sessions that currently carry a now-playing item.
    pub fn playing_sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|session| session.is_playing())
    }
}
