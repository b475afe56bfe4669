//! Runtime subscription configuration
//!
//! Mirrors the `runtime.json` file a bot ships with: which trigger types wake
//! the bot up, and which device types (and which of their parameter values)
//! are allowed to trigger it. The local host consults this before invoking a
//! bot, the way the platform does before scheduling an execution.

use crate::execution::Execution;
use crate::measures::Measures;
use crate::types::{Alert, Device, Result, TriggerMask, TriggerType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Contents of a bot's runtime.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Trigger types that invoke the bot
    #[serde(default)]
    pub trigger: TriggerMask,

    /// Cron expression for schedule triggers (evaluated by the platform)
    #[serde(default)]
    pub schedule: Option<String>,

    /// Device-type subscriptions; empty means no device filtering
    #[serde(default)]
    pub device_types: Vec<DeviceTypeSubscription>,
}

/// One `deviceTypes` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTypeSubscription {
    /// Device-type code
    pub id: u32,
    #[serde(default)]
    pub min_occurrence: u32,
    /// Whether this device type triggers the bot
    #[serde(default)]
    pub trigger: bool,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub control: bool,
    /// Measurement parameter that triggers the bot
    #[serde(default)]
    pub trigger_param_name: Option<String>,
    /// Comma-separated parameter values that trigger the bot
    #[serde(default)]
    pub trigger_param_values: Option<String>,
    /// Alert type that triggers the bot
    #[serde(default)]
    pub trigger_alert_type: Option<String>,
    /// Why the bot wants this device, per language
    #[serde(default)]
    pub reason: HashMap<String, String>,
}

impl DeviceTypeSubscription {
    /// Create a triggering, readable subscription for a device type
    pub fn new(id: u32) -> Self {
        Self {
            id,
            min_occurrence: 0,
            trigger: true,
            read: true,
            control: false,
            trigger_param_name: None,
            trigger_param_values: None,
            trigger_alert_type: None,
            reason: HashMap::new(),
        }
    }

    /// Builder method: trigger on a measurement parameter taking one of `values`
    pub fn triggering_on(mut self, param: impl Into<String>, values: impl Into<String>) -> Self {
        self.trigger_param_name = Some(param.into());
        self.trigger_param_values = Some(values.into());
        self
    }

    /// Builder method: trigger on an alert type
    pub fn triggering_on_alert(mut self, alert_type: impl Into<String>) -> Self {
        self.trigger_alert_type = Some(alert_type.into());
        self
    }

    /// Builder method: set the minimum number of devices required
    pub fn with_min_occurrence(mut self, min: u32) -> Self {
        self.min_occurrence = min;
        self
    }

    /// Builder method: set the English reason shown to the user
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason.insert("en".to_string(), reason.into());
        self
    }

    /// Check if `value` is one of the triggering parameter values
    pub fn matches_value(&self, value: &str) -> bool {
        match &self.trigger_param_values {
            Some(values) => values.split(',').any(|v| v.trim() == value),
            None => true,
        }
    }

    /// Check if a measurement from `device` should trigger the bot
    pub fn accepts_measurement(&self, device: &Device, measures: &Measures) -> bool {
        if !self.trigger {
            return false;
        }
        match &self.trigger_param_name {
            Some(param) => measures
                .for_device(&device.device_id, param)
                .or_else(|| measures.get(param))
                .map_or(false, |m| self.matches_value(&m.value)),
            None => true,
        }
    }

    /// Check if an alert from a device of this type should trigger the bot
    pub fn accepts_alert(&self, alerts: &[Alert]) -> bool {
        if !self.trigger {
            return false;
        }
        match &self.trigger_alert_type {
            Some(alert_type) => alerts.iter().any(|a| &a.alert_type == alert_type),
            None => true,
        }
    }
}

impl RuntimeConfig {
    /// Create a runtime configuration that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the trigger mask
    pub fn with_trigger_mask(mut self, mask: TriggerMask) -> Self {
        self.trigger = mask;
        self
    }

    /// Builder method: set the cron schedule
    pub fn with_schedule(mut self, cron: impl Into<String>) -> Self {
        self.schedule = Some(cron.into());
        self
    }

    /// Builder method: add a device-type subscription
    pub fn add_device_type(mut self, subscription: DeviceTypeSubscription) -> Self {
        self.device_types.push(subscription);
        self
    }

    /// Parse a runtime.json document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Subscription for a device-type code
    pub fn subscription(&self, device_type: u32) -> Option<&DeviceTypeSubscription> {
        self.device_types.iter().find(|s| s.id == device_type)
    }

    /// Check if the platform would invoke the bot for this execution
    pub fn accepts(&self, execution: &Execution) -> bool {
        if !self.trigger.contains(execution.trigger_type) {
            log::debug!("Trigger type '{}' not subscribed", execution.trigger_type);
            return false;
        }

        if self.device_types.is_empty() {
            return true;
        }

        match execution.trigger_type {
            TriggerType::DeviceMeasurement => execution.trigger_devices().iter().any(|device| {
                self.subscription(device.device_type)
                    .map_or(false, |s| s.accepts_measurement(device, &execution.measures))
            }),
            TriggerType::DeviceAlert => execution.trigger_devices().iter().any(|device| {
                self.subscription(device.device_type)
                    .map_or(false, |s| s.accepts_alert(&execution.alerts))
            }),
            _ => true,
        }
    }
}

/// Load a runtime.json file
pub fn load_runtime(path: &Path) -> Result<RuntimeConfig> {
    log::info!("Loading runtime configuration: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    RuntimeConfig::from_json(&content)
}
