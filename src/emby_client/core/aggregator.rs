use tracing::debug;

use super::super::api::DashboardResults;
use super::super::client::EmbyClient;

/// Fans the dashboard reads out over one client and gathers every outcome.
pub struct DashboardAggregator<'a> {
    client: &'a EmbyClient,
}

impl<'a> DashboardAggregator<'a> {
    pub fn new(client: &'a EmbyClient) -> Self {
        Self { client }
    }

    /// Issues all nine requests at once and waits for all of them.
    /// A failing request never cancels the others.
    pub async fn collect(&self, activity_limit: u32) -> DashboardResults {
        debug!("Fetching dashboard overview (9 concurrent requests)");
        let client = self.client;

        let (
            system_info,
            endpoint_info,
            items_counts,
            library_folders,
            sessions,
            users,
            activity_log,
            scheduled_tasks,
            devices,
        ) = tokio::join!(
            client.system_info(),
            client.endpoint_info(),
            client.items_counts(),
            client.library_folders(),
            client.sessions(),
            client.users(),
            client.activity_log(activity_limit),
            client.scheduled_tasks(),
            client.devices(),
        );

        let results = DashboardResults {
            system_info,
            endpoint_info,
            items_counts,
            library_folders,
            sessions,
            users,
            activity_log,
            scheduled_tasks,
            devices,
        };

        let failed = results.failed_sections();
        if failed.is_empty() {
            debug!("All dashboard requests succeeded");
        } else {
            debug!(failed = ?failed, "Dashboard fetched with partial failures");
        }
        results
    }
}
