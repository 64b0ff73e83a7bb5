use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use emby_monitor::config::Config;
use emby_monitor::coordinator::SnapshotCoordinator;
use emby_monitor::emby_client::EmbyClient;
use emby_monitor::types::MonitorError;
use emby_monitor::views::{DeviceView, ServerView};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// One JSON line with every server and device reading.
fn publish(
    server: &ServerView,
    devices: &mut [DeviceView],
    client: &EmbyClient,
) -> Result<(), MonitorError> {
    let devices: Vec<_> = devices
        .iter_mut()
        .map(|view| {
            view.sync();
            json!({
                "device_id": view.device().device_id,
                "name": view.display_name(),
                "model": view.model(),
                "available": view.is_available(),
                "sensors": view.readings(),
                "player": view.player(client),
            })
        })
        .collect();

    let line = serde_json::to_string(&json!({
        "server": server.readings(),
        "devices": devices,
    }))?;
    println!("{line}");
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();

    let config = Config::load().await;
    let client = match EmbyClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!(error = %err, "Failed to create Emby client");
            std::process::exit(1);
        }
    };

    if client.test_connection().await {
        info!(url = %client.base_url(), "Connected to Emby server");
    } else {
        warn!(url = %client.base_url(), "Emby server not reachable, will keep polling");
    }

    let coordinator = Arc::new(SnapshotCoordinator::new(
        client.clone(),
        config.scan_interval(),
    ));
    let server = ServerView::new(Arc::clone(&coordinator));
    let mut devices: Vec<DeviceView> = config
        .monitored_devices
        .iter()
        .cloned()
        .map(|device| DeviceView::new(Arc::clone(&coordinator), device))
        .collect();

    let mut updates = coordinator.subscribe();
    let publisher_client = Arc::clone(&client);
    let publisher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if let Err(err) = publish(&server, &mut devices, &publisher_client) {
                error!(error = %err, "Failed to publish readings");
            }
        }
    });

    coordinator
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;

    publisher.abort();
    info!("Shut down");
}
