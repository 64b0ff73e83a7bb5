//! Fixed-interval refresh loop holding the last good [`Snapshot`].
//!
//! Views never fetch on their own: they subscribe to the coordinator, get
//! woken once per finished cycle and pull whatever fields they need out of
//! [`SnapshotCoordinator::current_snapshot`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::emby_client::{EmbyClient, Snapshot};
use crate::types::EmbyError;

/// Anything able to produce a full snapshot in one call.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, EmbyError>;
}

#[async_trait]
impl DashboardSource for EmbyClient {
    async fn fetch_snapshot(&self) -> Result<Snapshot, EmbyError> {
        self.fetch_dashboard().await
    }
}

/// What subscribers observe after every cycle.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    pub snapshot: Option<Arc<Snapshot>>,
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub cycles: u64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl CoordinatorState {
    pub fn is_available(&self) -> bool {
        self.last_update_success && self.snapshot.is_some()
    }
}

pub struct SnapshotCoordinator {
    source: Arc<dyn DashboardSource>,
    update_interval: Duration,
    state: watch::Sender<CoordinatorState>,
    cycle_lock: Mutex<()>,
}

impl SnapshotCoordinator {
    pub fn new(source: Arc<dyn DashboardSource>, update_interval: Duration) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());
        Self {
            source,
            update_interval,
            state,
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn current_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.borrow().snapshot.clone()
    }

    pub fn last_refresh_succeeded(&self) -> bool {
        self.state.borrow().last_update_success
    }

    pub fn is_available(&self) -> bool {
        self.state.borrow().is_available()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    /// Receiver marked as changed once per completed cycle, successful or not.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    /// Run one cycle now and wait for it. Returns whether it succeeded.
    /// The periodic schedule is not affected.
    pub async fn request_refresh(&self) -> bool {
        let _cycle = self.cycle_lock.lock().await;

        match self.source.fetch_snapshot().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.state.send_modify(|state| {
                    state.snapshot = Some(snapshot);
                    state.last_update_success = true;
                    state.last_error = None;
                    state.last_refreshed_at = Some(Utc::now());
                    state.cycles += 1;
                });
                debug!("Successfully updated Emby data");
                true
            }
            Err(err) => {
                error!(error = %err, "Error fetching Emby data");
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.last_update_success = false;
                    state.last_error = Some(message);
                    state.cycles += 1;
                });
                false
            }
        }
    }

    /// Refresh immediately, then every `update_interval`, until `shutdown`
    /// resolves. An in-flight cycle is dropped on shutdown.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = time::interval(self.update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval = ?self.update_interval, "Starting refresh loop");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.request_refresh() => {}
            }
        }
        info!("Refresh loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use crate::emby_client::SystemInfo;

    /// Plays back scripted outcomes; succeeds with an empty snapshot once exhausted.
    #[derive(Default)]
    struct ScriptedSource {
        outcomes: StdMutex<VecDeque<Result<Snapshot, EmbyError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn with(outcomes: Vec<Result<Snapshot, EmbyError>>) -> Arc<Self> {
            Arc::new(Self {
                outcomes: StdMutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DashboardSource for ScriptedSource {
        async fn fetch_snapshot(&self) -> Result<Snapshot, EmbyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Snapshot::default()))
        }
    }

    fn named(server_name: &str) -> Snapshot {
        Snapshot {
            system_info: SystemInfo {
                server_name: Some(server_name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn unavailable_until_first_success() {
        let source = ScriptedSource::with(vec![Ok(named("Home"))]);
        let coordinator = SnapshotCoordinator::new(source, Duration::from_secs(30));

        assert!(!coordinator.is_available());
        assert!(coordinator.current_snapshot().is_none());

        assert!(coordinator.request_refresh().await);
        assert!(coordinator.is_available());
        assert_eq!(
            coordinator.current_snapshot().unwrap().server_name(),
            Some("Home")
        );
    }

    #[tokio::test]
    async fn failed_cycle_keeps_previous_snapshot() {
        let source = ScriptedSource::with(vec![
            Ok(named("Home")),
            Err(EmbyError::unknown("server exploded")),
        ]);
        let coordinator = SnapshotCoordinator::new(source, Duration::from_secs(30));

        assert!(coordinator.request_refresh().await);
        let before = coordinator.current_snapshot().unwrap();

        assert!(!coordinator.request_refresh().await);
        let after = coordinator.current_snapshot().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.server_name(), Some("Home"));
        assert!(!coordinator.last_refresh_succeeded());
        assert!(!coordinator.is_available());
        assert!(coordinator
            .last_error()
            .unwrap()
            .contains("server exploded"));
    }

    #[tokio::test]
    async fn failure_before_any_success_leaves_no_snapshot() {
        let source = ScriptedSource::with(vec![Err(EmbyError::Auth)]);
        let coordinator = SnapshotCoordinator::new(source, Duration::from_secs(30));

        assert!(!coordinator.request_refresh().await);
        assert!(coordinator.current_snapshot().is_none());
        assert_eq!(coordinator.state().cycles, 1);
    }

    #[tokio::test]
    async fn subscribers_see_every_cycle() {
        let source = ScriptedSource::with(vec![Ok(named("Home")), Err(EmbyError::Auth)]);
        let coordinator = SnapshotCoordinator::new(source, Duration::from_secs(30));
        let mut updates = coordinator.subscribe();
        assert!(!updates.has_changed().unwrap());

        coordinator.request_refresh().await;
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().last_update_success);
        assert!(!updates.has_changed().unwrap());

        coordinator.request_refresh().await;
        assert!(updates.has_changed().unwrap());
        let state = updates.borrow_and_update().clone();
        assert!(!state.last_update_success);
        assert_eq!(state.cycles, 2);
        assert!(state.snapshot.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_schedule_ignores_manual_refreshes() {
        let source = ScriptedSource::with(Vec::new());
        let coordinator = Arc::new(SnapshotCoordinator::new(
            source.clone(),
            Duration::from_secs(30),
        ));
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let runner = Arc::clone(&coordinator);
        let handle = tokio::spawn(async move {
            runner
                .run_until(async {
                    let _ = stop_rx.await;
                })
                .await;
        });

        // Ticks at 0s, 30s and 60s.
        time::sleep(Duration::from_secs(61)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        coordinator.request_refresh().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);

        // Next periodic tick is still at 90s.
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
        assert_eq!(coordinator.state().cycles, 5);

        stop_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
