use serde::Serialize;
use serde_json::Value;

use crate::emby_client::{Session, Snapshot};

/// A single observable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for SensorValue {
    fn from(value: bool) -> Self {
        SensorValue::Bool(value)
    }
}

impl From<i64> for SensorValue {
    fn from(value: i64) -> Self {
        SensorValue::Int(value)
    }
}

impl From<usize> for SensorValue {
    fn from(value: usize) -> Self {
        SensorValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<String> for SensorValue {
    fn from(value: String) -> Self {
        SensorValue::Text(value)
    }
}

impl From<&str> for SensorValue {
    fn from(value: &str) -> Self {
        SensorValue::Text(value.to_string())
    }
}

/// Server-wide value read straight out of a snapshot.
pub struct SensorDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub unit: Option<&'static str>,
    /// Still reported while the coordinator is unavailable.
    pub always_available: bool,
    pub value: fn(&Snapshot) -> Option<SensorValue>,
    pub attributes: Option<fn(&Snapshot) -> Value>,
}

/// Sessions of one device as seen by its extractors.
pub struct DeviceContext<'a> {
    pub device_id: &'a str,
    /// Matching sessions with something playing, in server order.
    pub playing: Vec<&'a Session>,
}

impl<'a> DeviceContext<'a> {
    pub fn active(&self) -> Option<&'a Session> {
        self.playing.first().copied()
    }
}

/// Per-device value read from the device's active session, if any.
pub struct DeviceSensorDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub unit: Option<&'static str>,
    pub value: fn(Option<&Session>) -> SensorValue,
    pub attributes: Option<fn(&DeviceContext<'_>) -> Value>,
}

/// One value as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub key: String,
    pub name: String,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    pub available: bool,
    pub value: Option<SensorValue>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub attributes: Value,
}
