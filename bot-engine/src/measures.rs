//! Typed access to the measurements block
//!
//! The platform hands over measurements as a flat list. Bots almost always want
//! "the value of parameter X", so the list is indexed by name once, when the
//! payload is parsed. Lookups keep first-match semantics: when a name occurs
//! more than once, the earliest record wins.

use crate::types::{BotError, Measurement, Result};
use std::collections::HashMap;

/// Measurements delivered with one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measures {
    /// Records in arrival order
    records: Vec<Measurement>,
    /// Measurement name -> index of the first record with that name
    by_name: HashMap<String, usize>,
}

impl Measures {
    pub fn new(records: Vec<Measurement>) -> Self {
        let mut measures = Self::default();
        for record in records {
            measures.push(record);
        }
        measures
    }

    /// Append a record; an earlier record with the same name keeps precedence
    pub fn push(&mut self, record: Measurement) {
        let index = self.records.len();
        self.by_name.entry(record.name.clone()).or_insert(index);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.records.iter()
    }

    /// First record with the given parameter name
    pub fn get(&self, name: &str) -> Option<&Measurement> {
        self.by_name.get(name).map(|&index| &self.records[index])
    }

    /// Current value of the first record with the given parameter name
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|m| m.value.as_str())
    }

    /// Like [`Measures::value`], but a missing parameter is an error
    pub fn require_value(&self, name: &str) -> Result<&str> {
        self.value(name)
            .ok_or_else(|| BotError::PropertyNotFound(name.to_string()))
    }

    /// First record with the given name reported by a specific device
    pub fn for_device(&self, device_id: &str, name: &str) -> Option<&Measurement> {
        self.records
            .iter()
            .find(|m| m.device_id == device_id && m.name == name)
    }

    /// Generic property lookup
    ///
    /// Returns `value_field` of the first record whose `key_field` equals
    /// `key_value`, or `None` if no record matches. Field names use the wire
    /// spelling (`deviceId`, `name`, `value`, `prevValue`, `time`, `prevTime`,
    /// `updated`).
    ///
    /// # Example
    /// ```
    /// use bot_engine::{Measurement, Measures};
    ///
    /// let measures = Measures::new(vec![Measurement::new("door-1", "doorStatus", "true")]);
    /// let status = measures.get_property("name", "doorStatus", "value");
    /// assert_eq!(status.as_deref(), Some("true"));
    /// ```
    pub fn get_property(&self, key_field: &str, key_value: &str, value_field: &str) -> Option<String> {
        if key_field == "name" {
            return self.get(key_value).and_then(|m| m.field(value_field));
        }

        self.records
            .iter()
            .find(|m| m.field(key_field).as_deref() == Some(key_value))
            .and_then(|m| m.field(value_field))
    }
}

impl From<Vec<Measurement>> for Measures {
    fn from(records: Vec<Measurement>) -> Self {
        Self::new(records)
    }
}
