//! Lesson 5 - Combining triggers
//!
//! One bot woken up by schedules, mode changes, device alerts and device
//! measurements (trigger mask 15). Doors opening and switches turning on also
//! start a 5 second timer that reports back with the device name.

use crate::config::{DeviceTypeSubscription, RuntimeConfig};
use crate::context::{BotContext, TimerCallback};
use crate::execution::Event;
use crate::host::Bot;
use crate::measures::Measures;
use crate::types::{format_millis, Alert, BotError, Device, DeviceKind, Location, Result, TriggerMask};

use super::measurements::switch_status;

/// Delay before `timer_fired` runs after a door opens or a switch turns on
pub const TIMER_DELAY_SECS: u64 = 5;

/// Timer entry point registered by this lesson
pub const TIMER_FIRED: TimerCallback = TimerCallback::new("timer_fired", timer_fired);

pub struct CombiningTriggers;

/// Subscriptions: every trigger kind, four device types
pub fn runtime() -> RuntimeConfig {
    RuntimeConfig::new()
        .with_trigger_mask(TriggerMask(15))
        .with_schedule("0/30 * * * * ?")
        .add_device_type(
            DeviceTypeSubscription::new(DeviceKind::EntrySensor.code())
                .triggering_on("doorStatus", "true")
                .with_reason("We're going to monitor your doors and windows."),
        )
        .add_device_type(
            DeviceTypeSubscription::new(DeviceKind::WaterSensor.code())
                .triggering_on("waterStatus", "true")
                .with_reason("We're going to monitor your water leak detector."),
        )
        .add_device_type(
            DeviceTypeSubscription::new(DeviceKind::VirtualLightSwitch.code())
                .triggering_on("ppc.switchStatus", "0,1")
                .with_reason("We're going to listen for measurements from your virtual light switch."),
        )
        .add_device_type(
            DeviceTypeSubscription::new(DeviceKind::PresenceCamera.code())
                .with_min_occurrence(1)
                .triggering_on_alert("motion")
                .with_reason("Listening for motion recording events"),
        )
}

impl Bot for CombiningTriggers {
    fn name(&self) -> &'static str {
        "combining-triggers"
    }

    fn description(&self) -> &'static str {
        "Lesson 5: schedules, modes, alerts and measurements with a timer"
    }

    fn runtime(&self) -> RuntimeConfig {
        runtime()
    }

    fn run(&self, bot: &mut BotContext<'_>) -> Result<()> {
        match bot.execution().event() {
            Event::Schedule { time } => on_schedule(bot, time),
            Event::Mode { locations } => on_mode(bot, &locations),
            Event::DeviceAlert { devices, alerts } => on_alert(bot, &devices, alerts),
            Event::DeviceMeasurement { devices, measures } => on_measurement(bot, &devices, measures),
            Event::Other(trigger) => {
                log::debug!("Nothing to do for {} trigger", trigger);
                Ok(())
            }
        }
    }
}

fn on_schedule(bot: &mut BotContext<'_>, time: i64) -> Result<()> {
    bot.info("Executing on schedule");
    bot.info(format!("\t=> Unix timestamp in milliseconds = {}", time));
    bot.info(format!("\t=> Human readable timestamp: {}", format_millis(time)?));
    Ok(())
}

fn on_mode(bot: &mut BotContext<'_>, locations: &[&Location]) -> Result<()> {
    // Always a single location in practice, but delivered as a list
    for location in locations {
        bot.info("Executing on a change of mode");
        let mode = location
            .event
            .as_deref()
            .ok_or_else(|| BotError::MissingField("location.event".to_string()))?;
        bot.info(format!("Your current mode is {}", mode));
    }
    Ok(())
}

fn on_alert(bot: &mut BotContext<'_>, devices: &[&Device], alerts: &[Alert]) -> Result<()> {
    // Parent and child devices may trigger together
    for device in devices {
        bot.info("Executing on a device alert");
        for alert in alerts {
            bot.info(format!(
                "Got a '{}' alert from your '{}'!",
                alert.alert_type, device.description
            ));
            for param in &alert.params {
                bot.info(format!("\t{} = {}", param.name, param.value));
            }
        }
    }
    Ok(())
}

fn on_measurement(bot: &mut BotContext<'_>, devices: &[&Device], measures: &Measures) -> Result<()> {
    for device in devices {
        bot.info("Executing on a new device measurement");
        let name = device.description.as_str();

        match device.kind() {
            DeviceKind::EntrySensor => {
                bot.info("\t=> It's an Entry Sensor");
                if measures.require_value("doorStatus")? == "true" {
                    bot.info(format!("\t=> Your '{}' opened", name));
                    bot.start_timer(TIMER_DELAY_SECS, TIMER_FIRED, name);
                } else {
                    bot.info(format!("\t=> Your '{}' closed", name));
                }
            }
            DeviceKind::WaterSensor => {
                bot.info("\t=> It's a Water Sensor");
                if measures.require_value("waterStatus")? == "true" {
                    bot.info(format!("\t=> Your '{}' got wet", name));
                } else {
                    bot.info(format!("\t=> Your '{}' dried up", name));
                }
            }
            DeviceKind::VirtualLightSwitch => {
                bot.info("\t=> It's a Virtual Light Switch");
                if switch_status(measures.require_value("ppc.switchStatus")?)? > 0 {
                    bot.info(format!("Your '{}' switched on", name));
                    bot.start_timer(TIMER_DELAY_SECS, TIMER_FIRED, name);
                } else {
                    bot.info(format!("Your '{}' switched off", name));
                }
            }
            other => log::debug!("No handler for device kind {:?}", other),
        }
    }
    Ok(())
}

/// Runs when a timer started by this lesson fires; `argument` is the device name
pub fn timer_fired(bot: &mut BotContext<'_>, argument: &str) -> Result<()> {
    bot.info(format!(
        "Your timer fired because your '{}' opened recently!",
        argument
    ));
    Ok(())
}
