//! JSON data format serializer.
//!
//! Emits one JSON object per measurement, followed by a newline:
//!
//! ```text
//! {"fields":{...},"name":"...","tags":{...},"timestamp":N}
//! ```
//!
//! The timestamp is scaled down from nanoseconds to the configured units. Every field value type
//! is representable in JSON, so no field is ever skipped.

use std::collections::BTreeMap;

use serde_json::json;
use wireline_event::Measurement;

use crate::{GenericError, Serializer};

/// JSON serializer.
pub struct JsonSerializer {
    timestamp_units: u64,
}

impl JsonSerializer {
    /// Creates a new `JsonSerializer` emitting timestamps in the given units, expressed in
    /// nanoseconds.
    ///
    /// The units are rounded down to the nearest power of ten nanoseconds, so `3ms` behaves as
    /// `1ms` rather than some unaligned divisor.
    pub fn new(timestamp_units_nanos: u64) -> Self {
        Self {
            timestamp_units: truncate_units(timestamp_units_nanos),
        }
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, measurement: &Measurement) -> Result<Vec<u8>, GenericError> {
        // Sorted maps keep the emitted object stable across calls.
        let tags = measurement.tags().iter().collect::<BTreeMap<_, _>>();
        let fields = measurement.fields().iter().collect::<BTreeMap<_, _>>();

        let object = json!({
            "fields": fields,
            "name": measurement.name(),
            "tags": tags,
            "timestamp": measurement.timestamp() / self.timestamp_units,
        });

        let mut out = serde_json::to_vec(&object)?;
        out.push(b'\n');
        Ok(out)
    }
}

/// Parses a duration string such as `1s` or `10ms` into nanoseconds.
///
/// Returns `None` for anything that is not a positive integer followed by one of the `ns`, `us`,
/// `ms`, or `s` suffixes.
pub(crate) fn parse_timestamp_units(units: &str) -> Option<u64> {
    let units = units.trim();
    let (value, scale) = if let Some(value) = units.strip_suffix("ns") {
        (value, 1)
    } else if let Some(value) = units.strip_suffix("us") {
        (value, 1_000)
    } else if let Some(value) = units.strip_suffix("ms") {
        (value, 1_000_000)
    } else if let Some(value) = units.strip_suffix('s') {
        (value, 1_000_000_000)
    } else {
        return None;
    };

    let value = value.trim().parse::<u64>().ok()?;
    if value == 0 {
        return None;
    }
    value.checked_mul(scale)
}

fn truncate_units(nanos: u64) -> u64 {
    let mut units: u64 = 1;
    while let Some(next) = units.checked_mul(10) {
        if next > nanos {
            break;
        }
        units = next;
    }
    units
}

#[cfg(test)]
mod tests {
    use wireline_event::FieldValue;

    use super::*;

    const TIMESTAMP_NANOS: u64 = 1_465_839_830_100_400_200;

    fn serialize_to_value(serializer: &JsonSerializer, measurement: &Measurement) -> serde_json::Value {
        let buf = serializer.serialize(measurement).expect("should serialize");
        assert_eq!(buf.last(), Some(&b'\n'));
        serde_json::from_slice(&buf).expect("output should be valid JSON")
    }

    #[test]
    fn test_serialize_shape() {
        let measurement = Measurement::new("cpu", TIMESTAMP_NANOS)
            .with_tag("cpu", "cpu0")
            .with_tag("host", "realHost")
            .with_field("usage_idle", 91.5)
            .with_field("state", "idle")
            .with_field("online", true);

        let serializer = JsonSerializer::new(1_000_000_000);
        let value = serialize_to_value(&serializer, &measurement);

        assert_eq!(
            value,
            serde_json::json!({
                "fields": { "online": true, "state": "idle", "usage_idle": 91.5 },
                "name": "cpu",
                "tags": { "cpu": "cpu0", "host": "realHost" },
                "timestamp": 1_465_839_830u64,
            })
        );
    }

    #[test]
    fn test_serialize_timestamp_units() {
        let measurement = Measurement::new("cpu", TIMESTAMP_NANOS).with_field("value", 1i64);

        let serializer = JsonSerializer::new(1_000_000);
        let value = serialize_to_value(&serializer, &measurement);
        assert_eq!(value["timestamp"], serde_json::json!(1_465_839_830_100u64));
    }

    #[test]
    fn test_serialize_unsigned_field_beyond_signed_range() {
        let measurement = Measurement::new("mem", TIMESTAMP_NANOS)
            .with_field("total", FieldValue::Unsigned(u64::MAX));

        let serializer = JsonSerializer::new(1_000_000_000);
        let value = serialize_to_value(&serializer, &measurement);
        assert_eq!(value["fields"]["total"], serde_json::json!(u64::MAX));
    }

    #[test]
    fn test_parse_timestamp_units() {
        assert_eq!(parse_timestamp_units("1s"), Some(1_000_000_000));
        assert_eq!(parse_timestamp_units("10ms"), Some(10_000_000));
        assert_eq!(parse_timestamp_units("1us"), Some(1_000));
        assert_eq!(parse_timestamp_units("100ns"), Some(100));
        assert_eq!(parse_timestamp_units(" 1s "), Some(1_000_000_000));

        assert_eq!(parse_timestamp_units("0s"), None);
        assert_eq!(parse_timestamp_units("1"), None);
        assert_eq!(parse_timestamp_units("-1s"), None);
        assert_eq!(parse_timestamp_units("second"), None);
        assert_eq!(parse_timestamp_units(""), None);
    }

    #[test]
    fn test_truncate_units_rounds_down_to_power_of_ten() {
        assert_eq!(truncate_units(1), 1);
        assert_eq!(truncate_units(999), 100);
        assert_eq!(truncate_units(1_000), 1_000);
        assert_eq!(truncate_units(3_000_000), 1_000_000);
        assert_eq!(truncate_units(1_000_000_000), 1_000_000_000);
        assert_eq!(truncate_units(0), 1);
    }
}
