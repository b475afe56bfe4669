//! Core types for the bot engine library
//!
//! This module defines the typed records a bot sees when the platform invokes it.
//! Everything here is a read-only view of a single invocation's payload: nothing
//! survives once the bot returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Timestamp type used throughout the engine
pub type Timestamp = DateTime<Utc>;

/// Result type for bot engine operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Errors that can occur while parsing a payload or running a bot
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Unknown trigger type: {0}")]
    UnknownTrigger(u32),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(String),

    #[error("Invalid value for '{name}': {value}")]
    InvalidValue { name: String, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why the platform invoked the bot this time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    /// Cron schedule declared in runtime.json
    Schedule,
    /// Location mode change (home / away / sleep / vacation)
    Mode,
    /// Alert raised by a device
    DeviceAlert,
    /// New measurement reported by a device
    DeviceMeasurement,
    /// A user answered a question
    QuestionAnswered,
    /// New device file (video, picture)
    DeviceFile,
    /// Execute again, used for timer invocations
    ExecuteAgain,
}

impl TriggerType {
    /// All trigger types, in bit order
    pub const ALL: [TriggerType; 7] = [
        TriggerType::Schedule,
        TriggerType::Mode,
        TriggerType::DeviceAlert,
        TriggerType::DeviceMeasurement,
        TriggerType::QuestionAnswered,
        TriggerType::DeviceFile,
        TriggerType::ExecuteAgain,
    ];

    /// Numeric code used on the wire
    pub fn code(self) -> u32 {
        match self {
            TriggerType::Schedule => 1,
            TriggerType::Mode => 2,
            TriggerType::DeviceAlert => 4,
            TriggerType::DeviceMeasurement => 8,
            TriggerType::QuestionAnswered => 16,
            TriggerType::DeviceFile => 32,
            TriggerType::ExecuteAgain => 64,
        }
    }
}

impl TryFrom<u32> for TriggerType {
    type Error = BotError;

    fn try_from(code: u32) -> Result<Self> {
        TriggerType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(BotError::UnknownTrigger(code))
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerType::Schedule => "schedule",
            TriggerType::Mode => "mode",
            TriggerType::DeviceAlert => "device alert",
            TriggerType::DeviceMeasurement => "device measurement",
            TriggerType::QuestionAnswered => "question answered",
            TriggerType::DeviceFile => "device file",
            TriggerType::ExecuteAgain => "execute again",
        };
        write!(f, "{}", name)
    }
}

/// Set of trigger types a bot subscribes to (bitwise OR of trigger codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerMask(pub u32);

impl TriggerMask {
    /// Every known trigger type
    pub const ALL: TriggerMask = TriggerMask(127);

    /// Build a mask from a list of trigger types
    pub fn of(triggers: &[TriggerType]) -> Self {
        TriggerMask(triggers.iter().fold(0, |mask, t| mask | t.code()))
    }

    /// Check if a trigger type is part of this mask
    pub fn contains(&self, trigger: TriggerType) -> bool {
        self.0 & trigger.code() != 0
    }
}

impl Default for TriggerMask {
    fn default() -> Self {
        TriggerMask::ALL
    }
}

/// Device classes the lessons know how to interpret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Door/window entry sensor (10014)
    EntrySensor,
    /// Water leak sensor (10017)
    WaterSensor,
    /// Virtual light switch (10072)
    VirtualLightSwitch,
    /// iOS Presence camera (24)
    PresenceCamera,
    /// Any other device-type code
    Other(u32),
}

impl DeviceKind {
    pub fn code(self) -> u32 {
        match self {
            DeviceKind::EntrySensor => 10014,
            DeviceKind::WaterSensor => 10017,
            DeviceKind::VirtualLightSwitch => 10072,
            DeviceKind::PresenceCamera => 24,
            DeviceKind::Other(code) => code,
        }
    }
}

impl From<u32> for DeviceKind {
    fn from(code: u32) -> Self {
        match code {
            10014 => DeviceKind::EntrySensor,
            10017 => DeviceKind::WaterSensor,
            10072 => DeviceKind::VirtualLightSwitch,
            24 => DeviceKind::PresenceCamera,
            other => DeviceKind::Other(other),
        }
    }
}

/// Device descriptor carried by access and trigger records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Globally unique device ID
    pub device_id: String,
    /// Human-readable name chosen by the user
    pub description: String,
    /// Device-type code (see [`DeviceKind`])
    pub device_type: u32,
    #[serde(default)]
    pub location_id: Option<u64>,
    #[serde(default)]
    pub measure_date: Option<i64>,
    #[serde(default)]
    pub update_date: Option<i64>,
    #[serde(default)]
    pub start_date: Option<i64>,
}

impl Device {
    pub fn new(device_id: impl Into<String>, description: impl Into<String>, device_type: u32) -> Self {
        Self {
            device_id: device_id.into(),
            description: description.into(),
            device_type,
            location_id: None,
            measure_date: None,
            update_date: None,
            start_date: None,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        DeviceKind::from(self.device_type)
    }
}

/// Location descriptor, carries the current mode on mode triggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub location_id: u64,
    /// Current mode (HOME, AWAY, SLEEP, VACATION, ...)
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Location {
    pub fn new(location_id: u64) -> Self {
        Self {
            location_id,
            event: None,
            name: None,
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }
}

/// Category of an access block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum AccessCategory {
    Location,
    Device,
    Other(u32),
}

impl From<u32> for AccessCategory {
    fn from(code: u32) -> Self {
        match code {
            1 => AccessCategory::Location,
            4 => AccessCategory::Device,
            other => AccessCategory::Other(other),
        }
    }
}

impl From<AccessCategory> for u32 {
    fn from(category: AccessCategory) -> Self {
        match category {
            AccessCategory::Location => 1,
            AccessCategory::Device => 4,
            AccessCategory::Other(code) => code,
        }
    }
}

/// Something the bot is allowed to read or control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Access {
    pub category: AccessCategory,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub control: bool,
    /// True if this item caused the current invocation
    #[serde(default)]
    pub trigger: bool,
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Access {
    /// Access block for a device that triggered the invocation
    pub fn device_trigger(device: Device) -> Self {
        Self {
            category: AccessCategory::Device,
            read: true,
            control: false,
            trigger: true,
            device: Some(device),
            location: None,
        }
    }

    /// Access block for a location that triggered the invocation
    pub fn location_trigger(location: Location) -> Self {
        Self {
            category: AccessCategory::Location,
            read: true,
            control: false,
            trigger: true,
            device: None,
            location: Some(location),
        }
    }
}

/// A trigger record: the item that caused this invocation
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerRecord {
    Device(Device),
    Location(Location),
}

impl TriggerRecord {
    pub fn device(&self) -> Option<&Device> {
        match self {
            TriggerRecord::Device(device) => Some(device),
            TriggerRecord::Location(_) => None,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            TriggerRecord::Location(location) => Some(location),
            TriggerRecord::Device(_) => None,
        }
    }
}

/// A timestamped named value reported by a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub device_id: String,
    pub name: String,
    #[serde(deserialize_with = "loose_string")]
    pub value: String,
    #[serde(default, deserialize_with = "loose_string_opt")]
    pub prev_value: Option<String>,
    /// Measurement time in milliseconds since epoch
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub prev_time: Option<i64>,
    #[serde(default)]
    pub updated: bool,
}

impl Measurement {
    pub fn new(device_id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            name: name.into(),
            value: value.into(),
            prev_value: None,
            time: 0,
            prev_time: None,
            updated: true,
        }
    }

    /// Read a field by its wire name
    pub fn field(&self, field: &str) -> Option<String> {
        match field {
            "deviceId" => Some(self.device_id.clone()),
            "name" => Some(self.name.clone()),
            "value" => Some(self.value.clone()),
            "prevValue" => self.prev_value.clone(),
            "time" => Some(self.time.to_string()),
            "prevTime" => self.prev_time.map(|t| t.to_string()),
            "updated" => Some(self.updated.to_string()),
            _ => None,
        }
    }
}

/// A named parameter attached to an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertParam {
    pub name: String,
    #[serde(deserialize_with = "loose_string")]
    pub value: String,
}

/// A named event with parameters reported by a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default)]
    pub device_id: String,
    pub alert_type: String,
    #[serde(default)]
    pub params: Vec<AlertParam>,
}

impl Alert {
    pub fn new(device_id: impl Into<String>, alert_type: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            alert_type: alert_type.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(AlertParam {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Convert a millisecond timestamp to a [`Timestamp`]
pub fn timestamp_from_millis(millis: i64) -> Result<Timestamp> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| BotError::InvalidValue {
        name: "time".to_string(),
        value: millis.to_string(),
    })
}

/// Format a millisecond timestamp as `YYYY-mm-dd HH:MM:SS` (UTC)
pub fn format_millis(millis: i64) -> Result<String> {
    Ok(timestamp_from_millis(millis)?
        .format("%Y-%m-%d %H:%M:%S")
        .to_string())
}

// Devices report values as strings, numbers or booleans depending on firmware.
fn scalar_to_string<E: serde::de::Error>(value: Value) -> std::result::Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!("expected a scalar value, found {}", other))),
    }
}

fn loose_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_string(Value::deserialize(deserializer)?)
}

fn loose_string_opt<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        other => scalar_to_string(other).map(Some),
    }
}
