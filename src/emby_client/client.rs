use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::types::{EmbyError, MonitorError};

use super::api::{
    ActivityEntry, ActivityLogQuery, Device, EndpointInfo, ItemCounts, LibraryFolder,
    PublicSystemInfo, ScheduledTask, SectionResult, Session, SystemInfo, User,
};
use super::core::DashboardAggregator;
use super::helpers::{
    ItemList, ACTIVITY_LOG_PATH, DEVICES_PATH, ENDPOINT_INFO_PATH, ITEMS_COUNTS_PATH,
    LIBRARY_FOLDERS_PATH, PUBLIC_SYSTEM_INFO_PATH, SCHEDULED_TASKS_PATH, SESSIONS_PATH,
    SYSTEM_INFO_PATH, TOKEN_HEADER, USERS_PATH,
};
use super::models::Snapshot;

/// Read-only client for one Emby server.
#[derive(Clone)]
pub struct EmbyClient {
    api_key: String,
    http: Client,
    base_url: String,
    timeout: Duration,
    activity_limit: u32,
}

impl EmbyClient {
    /// Build a client with its own connection pool.
    /// Self-signed certificates are accepted, local servers rarely have anything else.
    pub fn new(config: &Config) -> Result<Self, MonitorError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(MonitorError::Http)?;
        Self::with_http(config, http)
    }

    /// Build a client on top of a pool owned by the caller.
    pub fn with_http(config: &Config, http: Client) -> Result<Self, MonitorError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(MonitorError::MissingApiKey);
        }

        Ok(Self {
            api_key: api_key.to_string(),
            http,
            base_url: config.base_url(),
            timeout: config.request_timeout(),
            activity_limit: config.activity_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch every dashboard section concurrently. Failed sections come back empty.
    pub async fn dashboard_overview(&self) -> Snapshot {
        DashboardAggregator::new(self)
            .collect(self.activity_limit)
            .await
            .into_snapshot()
    }

    /// Same fetch, but an error when no request at all succeeded.
    pub async fn fetch_dashboard(&self) -> Result<Snapshot, EmbyError> {
        DashboardAggregator::new(self)
            .collect(self.activity_limit)
            .await
            .into_checked_snapshot()
    }

    /// True when the public info endpoint answers with a server name.
    pub async fn test_connection(&self) -> bool {
        match self.public_system_info().await {
            Ok(Some(info)) => info.server_name.is_some(),
            Ok(None) => false,
            Err(err) => {
                error!(error = %err, base_url = %self.base_url, "Connection test failed");
                false
            }
        }
    }

    pub fn primary_image_url(&self, item_id: &str) -> String {
        format!(
            "{}/Items/{}/Images/Primary?api_key={}",
            self.base_url, item_id, self.api_key
        )
    }

    pub async fn system_info(&self) -> SectionResult<SystemInfo> {
        self.get_json(SYSTEM_INFO_PATH).await
    }

    pub async fn public_system_info(&self) -> SectionResult<PublicSystemInfo> {
        self.get_json(PUBLIC_SYSTEM_INFO_PATH).await
    }

    pub async fn endpoint_info(&self) -> SectionResult<EndpointInfo> {
        self.get_json(ENDPOINT_INFO_PATH).await
    }

    pub async fn items_counts(&self) -> SectionResult<ItemCounts> {
        self.get_json(ITEMS_COUNTS_PATH).await
    }

    pub async fn library_folders(&self) -> SectionResult<Vec<LibraryFolder>> {
        self.get_list(LIBRARY_FOLDERS_PATH, &()).await
    }

    pub async fn sessions(&self) -> SectionResult<Vec<Session>> {
        self.get_list(SESSIONS_PATH, &()).await
    }

    pub async fn users(&self) -> SectionResult<Vec<User>> {
        self.get_list(USERS_PATH, &()).await
    }

    pub async fn activity_log(&self, limit: u32) -> SectionResult<Vec<ActivityEntry>> {
        let query = ActivityLogQuery { limit };
        self.get_list(ACTIVITY_LOG_PATH, &query).await
    }

    pub async fn scheduled_tasks(&self) -> SectionResult<Vec<ScheduledTask>> {
        self.get_list(SCHEDULED_TASKS_PATH, &()).await
    }

    pub async fn devices(&self) -> SectionResult<Vec<Device>> {
        self.get_list(DEVICES_PATH, &()).await
    }

    async fn get_list<T, Q>(&self, path: &str, query: &Q) -> SectionResult<Vec<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let list: Option<ItemList<T>> = self.get_json_with_query(path, query).await?;
        Ok(list.map(ItemList::into_vec))
    }

    async fn get_json<T>(&self, path: &str) -> SectionResult<T>
    where
        T: DeserializeOwned,
    {
        self.get_json_with_query(path, &()).await
    }

    async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> SectionResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        debug!(path, "Requesting Emby endpoint");

        let response = self
            .http
            .get(url)
            .header(TOKEN_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| EmbyError::from_transport(err, self.timeout))?;

        let status = response.status();
        debug!(path, status = %status, "Emby response");
        match status {
            StatusCode::UNAUTHORIZED => return Err(EmbyError::Auth),
            StatusCode::NOT_FOUND => {
                warn!(path, "Endpoint not found");
                return Ok(None);
            }
            status if !status.is_success() => {
                return Err(EmbyError::unknown(format!("{path} returned {status}")));
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|err| EmbyError::from_transport(err, self.timeout))
    }
}
