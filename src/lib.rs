//! Polls an Emby server, keeps the latest merged snapshot and derives
//! server-wide and per-device values from it.

pub mod config;
pub mod coordinator;
pub mod emby_client;
pub mod types;
pub mod views;
