//! A single bot invocation
//!
//! [`Execution`] holds everything the platform delivered for one invocation.
//! [`Execution::event`] classifies it into an [`Event`], the tagged view bots
//! match on.

use crate::measures::Measures;
use crate::types::{Access, Alert, Device, Location, Measurement, TriggerRecord, TriggerType};

/// Parsed invocation payload
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Invocation time in milliseconds since epoch
    pub time: i64,
    /// Why the bot was invoked
    pub trigger_type: TriggerType,
    /// Everything the bot has permission to access
    pub access: Vec<Access>,
    /// The access entries that caused this invocation
    pub triggers: Vec<TriggerRecord>,
    pub measures: Measures,
    pub alerts: Vec<Alert>,
}

/// Tagged view of an invocation, one variant per trigger kind
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    Schedule {
        time: i64,
    },
    Mode {
        locations: Vec<&'a Location>,
    },
    DeviceAlert {
        devices: Vec<&'a Device>,
        alerts: &'a [Alert],
    },
    DeviceMeasurement {
        devices: Vec<&'a Device>,
        measures: &'a Measures,
    },
    Other(TriggerType),
}

impl Execution {
    /// Create an empty execution for the given trigger type
    pub fn new(trigger_type: TriggerType, time: i64) -> Self {
        Self {
            time,
            trigger_type,
            access: Vec::new(),
            triggers: Vec::new(),
            measures: Measures::default(),
            alerts: Vec::new(),
        }
    }

    /// Builder method: add an access entry (and its trigger record, if it triggered)
    pub fn with_access(mut self, access: Access) -> Self {
        if access.trigger {
            if let Some(record) = trigger_record(&access) {
                self.triggers.push(record);
            }
        }
        self.access.push(access);
        self
    }

    /// Builder method: add a measurement
    pub fn with_measure(mut self, measurement: Measurement) -> Self {
        self.measures.push(measurement);
        self
    }

    /// Builder method: add an alert
    pub fn with_alert(mut self, alert: Alert) -> Self {
        self.alerts.push(alert);
        self
    }

    /// Devices among the trigger records
    pub fn trigger_devices(&self) -> Vec<&Device> {
        self.triggers.iter().filter_map(TriggerRecord::device).collect()
    }

    /// Locations among the trigger records
    pub fn trigger_locations(&self) -> Vec<&Location> {
        self.triggers.iter().filter_map(TriggerRecord::location).collect()
    }

    /// Classify this invocation
    pub fn event(&self) -> Event<'_> {
        match self.trigger_type {
            TriggerType::Schedule => Event::Schedule { time: self.time },
            TriggerType::Mode => Event::Mode {
                locations: self.trigger_locations(),
            },
            TriggerType::DeviceAlert => Event::DeviceAlert {
                devices: self.trigger_devices(),
                alerts: &self.alerts,
            },
            TriggerType::DeviceMeasurement => Event::DeviceMeasurement {
                devices: self.trigger_devices(),
                measures: &self.measures,
            },
            other => Event::Other(other),
        }
    }
}

/// Trigger record for an access entry, if it describes a device or location
pub(crate) fn trigger_record(access: &Access) -> Option<TriggerRecord> {
    if let Some(device) = &access.device {
        Some(TriggerRecord::Device(device.clone()))
    } else {
        access.location.clone().map(TriggerRecord::Location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_triggers() {
        let mut passive = Access::device_trigger(Device::new("cam", "Camera", 24));
        passive.trigger = false;

        let execution = Execution::new(TriggerType::DeviceMeasurement, 1000)
            .with_access(Access::device_trigger(Device::new("door-1", "Front Door", 10014)))
            .with_access(passive)
            .with_measure(Measurement::new("door-1", "doorStatus", "true"));

        assert_eq!(execution.access.len(), 2);
        assert_eq!(execution.triggers.len(), 1);

        match execution.event() {
            Event::DeviceMeasurement { devices, measures } => {
                assert_eq!(devices.len(), 1);
                assert_eq!(devices[0].description, "Front Door");
                assert_eq!(measures.value("doorStatus"), Some("true"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_mode_event() {
        let execution = Execution::new(TriggerType::Mode, 1000)
            .with_access(Access::location_trigger(Location::new(205).with_event("AWAY")));

        match execution.event() {
            Event::Mode { locations } => {
                assert_eq!(locations[0].event.as_deref(), Some("AWAY"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_other_event() {
        let execution = Execution::new(TriggerType::QuestionAnswered, 0);
        assert_eq!(execution.event(), Event::Other(TriggerType::QuestionAnswered));
    }
}
