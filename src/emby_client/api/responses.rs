use tracing::{debug, warn};

use crate::emby_client::models::Snapshot;
use crate::types::EmbyError;

use super::{
    ActivityEntry, Device, EndpointInfo, ItemCounts, LibraryFolder, ScheduledTask, Session,
    SystemInfo, User,
};

const SECTION_COUNT: usize = 9;

/// Outcome of one dashboard request. `Ok(None)` means the server answered 404.
pub type SectionResult<T> = Result<Option<T>, EmbyError>;

/// Raw per-section outcomes of one dashboard fetch, before fallbacks are applied.
#[derive(Debug)]
pub struct DashboardResults {
    pub system_info: SectionResult<SystemInfo>,
    pub endpoint_info: SectionResult<EndpointInfo>,
    pub items_counts: SectionResult<ItemCounts>,
    pub library_folders: SectionResult<Vec<LibraryFolder>>,
    pub sessions: SectionResult<Vec<Session>>,
    pub users: SectionResult<Vec<User>>,
    pub activity_log: SectionResult<Vec<ActivityEntry>>,
    pub scheduled_tasks: SectionResult<Vec<ScheduledTask>>,
    pub devices: SectionResult<Vec<Device>>,
}

impl DashboardResults {
    /// Names of the sections whose request failed.
    pub fn failed_sections(&self) -> Vec<&'static str> {
        [
            ("system_info", self.system_info.is_err()),
            ("endpoint_info", self.endpoint_info.is_err()),
            ("items_counts", self.items_counts.is_err()),
            ("library_folders", self.library_folders.is_err()),
            ("sessions", self.sessions.is_err()),
            ("users", self.users.is_err()),
            ("activity_log", self.activity_log.is_err()),
            ("scheduled_tasks", self.scheduled_tasks.is_err()),
            ("devices", self.devices.is_err()),
        ]
        .into_iter()
        .filter_map(|(name, failed)| failed.then_some(name))
        .collect()
    }

    /// Like [`into_snapshot`](Self::into_snapshot), but a fetch where every
    /// request failed is reported as the server being unreachable.
    pub fn into_checked_snapshot(self) -> Result<Snapshot, EmbyError> {
        if self.failed_sections().len() == SECTION_COUNT {
            if let Err(err) = self.system_info {
                warn!(error = %err, "Every dashboard request failed");
                return Err(err);
            }
        }
        Ok(self.into_snapshot())
    }

    /// Merge into a snapshot; every failed or missing section becomes empty.
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            system_info: settle("system_info", self.system_info),
            endpoint_info: settle("endpoint_info", self.endpoint_info),
            items_counts: settle("items_counts", self.items_counts),
            library_folders: settle("library_folders", self.library_folders),
            sessions: settle("sessions", self.sessions),
            users: settle("users", self.users),
            activity_log: settle("activity_log", self.activity_log),
            scheduled_tasks: settle("scheduled_tasks", self.scheduled_tasks),
            devices: settle("devices", self.devices),
        }
    }
}

fn settle<T: Default>(section: &'static str, outcome: SectionResult<T>) -> T {
    match outcome {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!(section, "Section not provided by this server, using empty value");
            T::default()
        }
        Err(err) => {
            warn!(section, error = %err, "Dashboard request failed, using empty value");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn all_ok() -> DashboardResults {
        DashboardResults {
            system_info: Ok(Some(SystemInfo {
                server_name: Some("Home".to_string()),
                ..Default::default()
            })),
            endpoint_info: Ok(Some(EndpointInfo {
                is_in_network: Some(true),
                ..Default::default()
            })),
            items_counts: Ok(Some(
                serde_json::from_value(serde_json::json!({"MovieCount": 3})).unwrap(),
            )),
            library_folders: Ok(Some(vec![LibraryFolder::default()])),
            sessions: Ok(Some(vec![Session::default(), Session::default()])),
            users: Ok(Some(vec![User::default()])),
            activity_log: Ok(Some(vec![ActivityEntry::default()])),
            scheduled_tasks: Ok(Some(vec![ScheduledTask::default()])),
            devices: Ok(Some(vec![Device::default()])),
        }
    }

    #[test]
    fn single_failure_only_empties_its_own_section() {
        let mut results = all_ok();
        results.users = Err(EmbyError::Timeout(Duration::from_secs(10)));

        assert_eq!(results.failed_sections(), vec!["users"]);
        let snapshot = results.into_snapshot();
        assert!(snapshot.users.is_empty());
        assert_eq!(snapshot.sessions.len(), 2);
        assert_eq!(snapshot.system_info.server_name.as_deref(), Some("Home"));
        assert_eq!(snapshot.endpoint_info.is_in_network, Some(true));
        assert_eq!(snapshot.items_counts.movies(), 3);
        assert_eq!(snapshot.library_folders.len(), 1);
        assert_eq!(snapshot.activity_log.len(), 1);
        assert_eq!(snapshot.scheduled_tasks.len(), 1);
        assert_eq!(snapshot.devices.len(), 1);
    }

    #[test]
    fn everything_failing_still_yields_every_section() {
        let results = DashboardResults {
            system_info: Err(EmbyError::Auth),
            endpoint_info: Err(EmbyError::Auth),
            items_counts: Err(EmbyError::unknown("bad gateway")),
            library_folders: Ok(None),
            sessions: Err(EmbyError::Timeout(Duration::from_secs(10))),
            users: Err(EmbyError::Auth),
            activity_log: Ok(None),
            scheduled_tasks: Err(EmbyError::unknown("boom")),
            devices: Err(EmbyError::Auth),
        };

        assert_eq!(results.failed_sections().len(), 7);
        let snapshot = results.into_snapshot();
        assert_eq!(snapshot, Snapshot::default());
        assert!(snapshot.system_info.is_empty());
        assert!(snapshot.endpoint_info.is_empty());
        assert!(snapshot.items_counts.is_empty());
    }

    #[test]
    fn checked_snapshot_fails_only_when_nothing_answered() {
        let mut partial = all_ok();
        partial.system_info = Err(EmbyError::Auth);
        assert!(partial.into_checked_snapshot().is_ok());

        let dead = DashboardResults {
            system_info: Err(EmbyError::Auth),
            endpoint_info: Err(EmbyError::Auth),
            items_counts: Err(EmbyError::Auth),
            library_folders: Err(EmbyError::Auth),
            sessions: Err(EmbyError::Auth),
            users: Err(EmbyError::Auth),
            activity_log: Err(EmbyError::Auth),
            scheduled_tasks: Err(EmbyError::Auth),
            devices: Err(EmbyError::Auth),
        };
        assert!(matches!(dead.into_checked_snapshot(), Err(EmbyError::Auth)));
    }
}
