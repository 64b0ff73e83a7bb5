#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use emby_monitor::config::Config;
use emby_monitor::emby_client::EmbyClient;
use mockito::{Matcher, Mock, ServerGuard};

pub const API_KEY: &str = "secret";

pub fn config_for(addr: SocketAddr) -> Config {
    Config {
        host: addr.ip().to_string(),
        port: addr.port(),
        api_key: API_KEY.to_string(),
        timeout_secs: 1,
        ..Default::default()
    }
}

pub fn client_for(addr: SocketAddr) -> EmbyClient {
    EmbyClient::new(&config_for(addr)).unwrap()
}

/// Every dashboard path with a small, valid body.
pub const DASHBOARD: &[(&str, &str)] = &[
    (
        "/System/Info",
        r#"{"ServerName":"Home","Version":"4.8.0.0","Id":"abc"}"#,
    ),
    ("/System/Endpoint", r#"{"IsLocal":true,"IsInNetwork":true}"#),
    (
        "/Items/Counts",
        r#"{"MovieCount":120,"SeriesCount":8,"EpisodeCount":310}"#,
    ),
    (
        "/Library/MediaFolders",
        r#"{"Items":[{"Name":"Movies","Id":"f1"}],"TotalRecordCount":1}"#,
    ),
    (
        "/Sessions",
        r#"[{"DeviceId":"shield-1","UserName":"alice","NowPlayingItem":{"Name":"Pilot"}}]"#,
    ),
    ("/Users", r#"[{"Name":"alice","Id":"u1"}]"#),
    (
        "/System/ActivityLog/Entries",
        r#"{"Items":[{"Id":1,"Name":"alice started playing","Type":"VideoPlayback"}]}"#,
    ),
    (
        "/ScheduledTasks",
        r#"[{"Name":"Scan media library","State":"Idle"}]"#,
    ),
    ("/Devices", r#"{"Items":[{"Id":"d1","Name":"Shield"}]}"#),
];

/// Answer `path` with a JSON body. Later mocks win over earlier ones.
pub async fn mock_json(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_header("x-emby-token", API_KEY)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

pub async fn mock_status(server: &mut ServerGuard, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(status)
        .create_async()
        .await
}

/// Send headers at once, then stall the body well past the client timeout.
pub async fn mock_stalled(server: &mut ServerGuard, path: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(|writer| {
            std::thread::sleep(Duration::from_secs(3));
            writer.write_all(b"[]")
        })
        .create_async()
        .await
}

/// Mocks for the dashboard paths not listed in `skip`. Keep the returned
/// mocks alive for the duration of the test.
pub async fn mock_dashboard(server: &mut ServerGuard, skip: &[&str]) -> Vec<Mock> {
    let mut mocks = Vec::new();
    for (path, body) in DASHBOARD {
        if !skip.contains(path) {
            mocks.push(mock_json(server, path, body).await);
        }
    }
    mocks
}
