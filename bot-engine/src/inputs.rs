//! Inputs parser
//!
//! Converts the loosely-typed JSON payload the platform delivers into an
//! [`Execution`]. All validation happens here so bots never see an untyped map.

use crate::execution::{trigger_record, Execution};
use crate::measures::Measures;
use crate::types::{Access, AccessCategory, Alert, BotError, Measurement, Result, TriggerType};
use serde::Deserialize;
use std::path::Path;

/// Wire shape of the inputs block
#[derive(Debug, Deserialize)]
struct RawInputs {
    time: Option<i64>,
    trigger: Option<u32>,
    #[serde(default)]
    access: Vec<Access>,
    #[serde(default)]
    measures: Vec<Measurement>,
    #[serde(default)]
    alerts: Vec<Alert>,
}

/// Parse an inputs JSON document
///
/// # Example
/// ```
/// use bot_engine::{parse_inputs, TriggerType};
///
/// let execution = parse_inputs(r#"{"time": 1467589363290, "trigger": 1}"#).unwrap();
/// assert_eq!(execution.trigger_type, TriggerType::Schedule);
/// ```
pub fn parse_inputs(json: &str) -> Result<Execution> {
    let raw: RawInputs = serde_json::from_str(json)?;
    from_raw(raw)
}

/// Parse an already-decoded JSON value
pub fn inputs_from_value(value: serde_json::Value) -> Result<Execution> {
    let raw: RawInputs = serde_json::from_value(value)?;
    from_raw(raw)
}

/// Load and parse an inputs file
pub fn load_inputs(path: &Path) -> Result<Execution> {
    log::info!("Loading inputs: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    parse_inputs(&content)
}

fn from_raw(raw: RawInputs) -> Result<Execution> {
    let time = raw.time.ok_or_else(|| BotError::MissingField("time".to_string()))?;
    let code = raw
        .trigger
        .ok_or_else(|| BotError::MissingField("trigger".to_string()))?;
    let trigger_type = TriggerType::try_from(code)?;

    let mut triggers = Vec::new();
    for (index, access) in raw.access.iter().enumerate() {
        validate_access(index, access)?;
        if access.trigger {
            if let Some(record) = trigger_record(access) {
                triggers.push(record);
            }
        }
    }

    log::debug!(
        "Parsed {} invocation: {} access, {} triggers, {} measures, {} alerts",
        trigger_type,
        raw.access.len(),
        triggers.len(),
        raw.measures.len(),
        raw.alerts.len()
    );

    Ok(Execution {
        time,
        trigger_type,
        access: raw.access,
        triggers,
        measures: Measures::new(raw.measures),
        alerts: raw.alerts,
    })
}

fn validate_access(index: usize, access: &Access) -> Result<()> {
    match access.category {
        AccessCategory::Device if access.device.is_none() => Err(BotError::InvalidPayload(
            format!("access[{}] is a device entry without a device", index),
        )),
        AccessCategory::Location if access.location.is_none() => Err(BotError::InvalidPayload(
            format!("access[{}] is a location entry without a location", index),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TriggerRecord;
    use std::io::Write;

    const SWITCH_INPUTS: &str = r#"{
        "access": [{
            "read": true,
            "category": 4,
            "trigger": true,
            "device": {
                "measureDate": 1467589363000,
                "updateDate": 1467589363000,
                "locationId": 205,
                "deviceId": "moss-switch1",
                "description": "Virtual Light Switch",
                "startDate": 1467588763000,
                "deviceType": 10072
            },
            "control": false
        }],
        "measures": [{
            "prevTime": 1467589362000,
            "value": "1",
            "prevValue": "0",
            "updated": true,
            "deviceId": "moss-switch1",
            "name": "ppc.switchStatus",
            "time": 1467589363000
        }],
        "trigger": 8,
        "time": 1467589363290
    }"#;

    #[test]
    fn test_parse_measurement_inputs() {
        let execution = parse_inputs(SWITCH_INPUTS).unwrap();
        assert_eq!(execution.time, 1467589363290);
        assert_eq!(execution.trigger_type, TriggerType::DeviceMeasurement);
        assert_eq!(execution.triggers.len(), 1);
        match &execution.triggers[0] {
            TriggerRecord::Device(device) => {
                assert_eq!(device.device_id, "moss-switch1");
                assert_eq!(device.location_id, Some(205));
            }
            other => panic!("unexpected trigger: {:?}", other),
        }
        assert_eq!(execution.measures.value("ppc.switchStatus"), Some("1"));
        assert!(execution.alerts.is_empty());
    }

    #[test]
    fn test_missing_time() {
        let err = parse_inputs(r#"{"trigger": 1}"#).unwrap_err();
        assert!(matches!(err, BotError::MissingField(ref f) if f == "time"));
    }

    #[test]
    fn test_unknown_trigger() {
        let err = parse_inputs(r#"{"time": 0, "trigger": 3}"#).unwrap_err();
        assert!(matches!(err, BotError::UnknownTrigger(3)));
    }

    #[test]
    fn test_device_entry_without_device() {
        let json = r#"{"time": 0, "trigger": 8, "access": [{"category": 4, "trigger": true}]}"#;
        let err = parse_inputs(json).unwrap_err();
        assert!(matches!(err, BotError::InvalidPayload(_)));
    }

    #[test]
    fn test_device_without_description_is_rejected() {
        let json = r#"{"time": 0, "trigger": 8, "access": [
            {"category": 4, "trigger": true, "device": {"deviceId": "d", "deviceType": 10014}}
        ]}"#;
        assert!(matches!(parse_inputs(json), Err(BotError::Json(_))));
    }

    #[test]
    fn test_load_inputs_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SWITCH_INPUTS.as_bytes()).unwrap();

        let execution = load_inputs(file.path()).unwrap();
        assert_eq!(execution.trigger_type, TriggerType::DeviceMeasurement);
    }

    #[test]
    fn test_inputs_from_value() {
        let value = serde_json::json!({"time": 5, "trigger": 2, "access": [
            {"category": 1, "trigger": true, "location": {"locationId": 1, "event": "HOME"}}
        ]});
        let execution = inputs_from_value(value).unwrap();
        assert_eq!(execution.trigger_locations()[0].event.as_deref(), Some("HOME"));
    }
}
