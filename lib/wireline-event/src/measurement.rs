use std::collections::HashMap;

use crate::FieldValue;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// A single timestamped, named, tagged collection of typed fields.
///
/// Measurements are the unit of telemetry that serializers encode. They are created and owned by
/// the caller; serializers only ever read them.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    name: String,
    timestamp: u64,
    tags: HashMap<String, String>,
    fields: HashMap<String, FieldValue>,
}

impl Measurement {
    /// Creates a new `Measurement` with the given name and timestamp, in nanoseconds since the
    /// Unix epoch, and no tags or fields.
    pub fn new<S: Into<String>>(name: S, timestamp: u64) -> Self {
        Self {
            name: name.into(),
            timestamp,
            tags: HashMap::new(),
            fields: HashMap::new(),
        }
    }

    /// Adds a tag to this measurement, overwriting any previous value for the same key.
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Adds a field to this measurement, overwriting any previous value for the same name.
    pub fn with_field<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the name of this measurement.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the timestamp of this measurement, in nanoseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Returns the timestamp of this measurement truncated to whole seconds since the Unix epoch.
    pub fn timestamp_secs(&self) -> u64 {
        self.timestamp / NANOS_PER_SECOND
    }

    /// Returns the tags of this measurement.
    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// Returns the fields of this measurement.
    pub fn fields(&self) -> &HashMap<String, FieldValue> {
        &self.fields
    }
}
