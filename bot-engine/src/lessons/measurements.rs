//! Lesson 1 - Measurements
//!
//! Listens to real-time measurements from door/window entry sensors and
//! virtual light switches, and prints what happened.

use crate::config::{DeviceTypeSubscription, RuntimeConfig};
use crate::context::BotContext;
use crate::execution::Event;
use crate::host::Bot;
use crate::types::{BotError, DeviceKind, Result, TriggerMask, TriggerType};

pub struct Measurements;

/// Subscriptions: measurements only, doors opening and switches toggling
pub fn runtime() -> RuntimeConfig {
    RuntimeConfig::new()
        .with_trigger_mask(TriggerMask::of(&[TriggerType::DeviceMeasurement]))
        .add_device_type(
            DeviceTypeSubscription::new(DeviceKind::EntrySensor.code())
                .with_min_occurrence(1)
                .triggering_on("doorStatus", "true")
                .with_reason("We're going to monitor your doors and windows."),
        )
        .add_device_type(
            DeviceTypeSubscription::new(DeviceKind::VirtualLightSwitch.code())
                .triggering_on("ppc.switchStatus", "0,1")
                .with_reason("Monitor your virtual light switches."),
        )
}

impl Bot for Measurements {
    fn name(&self) -> &'static str {
        "measurements"
    }

    fn description(&self) -> &'static str {
        "Lesson 1: print door and light switch measurements"
    }

    fn runtime(&self) -> RuntimeConfig {
        runtime()
    }

    fn run(&self, bot: &mut BotContext<'_>) -> Result<()> {
        let Event::DeviceMeasurement { devices, measures } = bot.execution().event() else {
            return Ok(());
        };

        for device in devices {
            let name = &device.description;

            match device.kind() {
                DeviceKind::EntrySensor => {
                    if measures.require_value("doorStatus")? == "true" {
                        bot.print(format!("Your '{}' opened!", name));
                    } else {
                        // Only reachable if the doorStatus subscription filter is relaxed
                        bot.print(format!("Your '{}' closed!", name));
                    }
                }
                DeviceKind::VirtualLightSwitch => {
                    if switch_status(measures.require_value("ppc.switchStatus")?)? > 0 {
                        bot.print(format!("Your '{}' switched on", name));
                    } else {
                        bot.print(format!("Your '{}' switched off", name));
                    }
                }
                other => log::debug!("No handler for device kind {:?}", other),
            }
        }

        Ok(())
    }
}

/// Parse a `ppc.switchStatus` value
pub(crate) fn switch_status(value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| BotError::InvalidValue {
        name: "ppc.switchStatus".to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Channel;
    use crate::execution::Execution;
    use crate::types::{Access, Device, Measurement};

    fn run(execution: &Execution) -> Result<crate::context::Response> {
        let mut bot = BotContext::new(execution);
        Measurements.run(&mut bot)?;
        Ok(bot.into_response())
    }

    fn measurement(device_type: u32, param: &str, value: &str) -> Execution {
        Execution::new(TriggerType::DeviceMeasurement, 1467589363290)
            .with_access(Access::device_trigger(Device::new("dev-1", "Front Door", device_type)))
            .with_measure(Measurement::new("dev-1", param, value))
    }

    #[test]
    fn test_door_opened() {
        let response = run(&measurement(10014, "doorStatus", "true")).unwrap();
        assert_eq!(response.lines.len(), 1);
        assert_eq!(response.lines[0].channel, Channel::Print);
        assert_eq!(response.lines[0].message, "Your 'Front Door' opened!");
        assert!(response.timers.is_empty());
    }

    #[test]
    fn test_door_closed_safety_branch() {
        let response = run(&measurement(10014, "doorStatus", "false")).unwrap();
        assert_eq!(response.lines[0].message, "Your 'Front Door' closed!");
    }

    #[test]
    fn test_switch() {
        let on = run(&measurement(10072, "ppc.switchStatus", "1")).unwrap();
        assert!(on.contains("switched on"));
        let off = run(&measurement(10072, "ppc.switchStatus", "0")).unwrap();
        assert!(off.contains("switched off"));
        assert!(on.timers.is_empty() && off.timers.is_empty());
    }

    #[test]
    fn test_switch_garbage_value() {
        let err = run(&measurement(10072, "ppc.switchStatus", "on")).unwrap_err();
        assert!(matches!(err, BotError::InvalidValue { .. }));
    }

    #[test]
    fn test_other_triggers_ignored() {
        let response = run(&Execution::new(TriggerType::Schedule, 0)).unwrap();
        assert!(response.lines.is_empty());
    }

    #[test]
    fn test_runtime_filters_closed_doors() {
        let runtime = runtime();
        assert!(runtime.accepts(&measurement(10014, "doorStatus", "true")));
        assert!(!runtime.accepts(&measurement(10014, "doorStatus", "false")));
        assert!(!runtime.accepts(&Execution::new(TriggerType::Schedule, 0)));
    }
}
