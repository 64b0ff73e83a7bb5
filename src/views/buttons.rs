use std::sync::Arc;

use tracing::{info, warn};

use crate::coordinator::SnapshotCoordinator;
use crate::emby_client::EmbyClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Refresh,
    TestConnection,
}

impl Button {
    pub const ALL: [Button; 2] = [Button::Refresh, Button::TestConnection];

    pub fn key(self) -> &'static str {
        match self {
            Button::Refresh => "refresh",
            Button::TestConnection => "test_connection",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Button::Refresh => "Emby Refresh",
            Button::TestConnection => "Emby Test Connection",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|button| button.key() == key)
    }
}

/// Manual actions exposed next to the sensors.
#[derive(Clone)]
pub struct Buttons {
    client: Arc<EmbyClient>,
    coordinator: Arc<SnapshotCoordinator>,
}

impl Buttons {
    pub fn new(client: Arc<EmbyClient>, coordinator: Arc<SnapshotCoordinator>) -> Self {
        Self {
            client,
            coordinator,
        }
    }

    /// Returns whether the action succeeded.
    pub async fn press(&self, button: Button) -> bool {
        match button {
            Button::Refresh => {
                info!("Manual refresh requested");
                self.coordinator.request_refresh().await
            }
            Button::TestConnection => {
                let connected = self.client.test_connection().await;
                if connected {
                    info!(url = %self.client.base_url(), "Connection test succeeded");
                } else {
                    warn!(url = %self.client.base_url(), "Connection test failed");
                }
                connected
            }
        }
    }
}
