//! Serializer implementations for metric wire formats.
//!
//! This crate contains the serializer contract shared by all wire formats, the configuration-based
//! registry used to construct serializers by name, and the individual format implementations.

#![deny(warnings)]
#![deny(missing_docs)]

use serde::Deserialize;
use snafu::{OptionExt as _, Snafu};
use wireline_event::Measurement;

pub mod json;
pub mod wavefront;

use self::json::JsonSerializer;
use self::wavefront::WavefrontSerializer;

/// Generic error type.
///
/// Serializer implementations surface open-ended failures (unsupported field types, downstream
/// encoding errors, and so on) through this type rather than a per-format error enum.
pub type GenericError = anyhow::Error;

/// A serializer for measurements.
///
/// Serializers turn a single in-memory measurement into the byte representation consumed by a
/// specific ingestion endpoint. Implementations are stateless apart from their construction-time
/// configuration, perform no I/O, and never mutate the measurement they are given, so a single
/// instance can be shared freely across threads.
pub trait Serializer {
    /// Serializes a single measurement into a byte buffer.
    ///
    /// For line-oriented formats, the buffer contains zero or more newline-terminated records,
    /// including a newline after the final record. An empty buffer is a valid result: a
    /// measurement can end up with nothing representable in the target format, and callers should
    /// skip emission rather than treat it as a failure.
    ///
    /// # Errors
    ///
    /// If the measurement cannot be encoded at all, an error is returned. Per-field problems are
    /// handled by the individual formats and do not fail the call.
    fn serialize(&self, measurement: &Measurement) -> Result<Vec<u8>, GenericError>;
}

/// An error encountered while building a serializer from its configuration.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum BuildError {
    /// The configured data format was not recognized.
    #[snafu(display("invalid data format: {}", format))]
    InvalidDataFormat {
        /// Name of the unrecognized format.
        format: String,
    },

    /// The configured timestamp units could not be parsed.
    #[snafu(display(
        "invalid timestamp units '{}': expected a positive duration such as '1s' or '10ms'",
        units
    ))]
    InvalidTimestampUnits {
        /// The offending units string.
        units: String,
    },
}

fn default_source_override() -> Vec<String> {
    // Identity tags the legacy encoder promoted to `source`, in its hard-coded priority order.
    ["instanceid", "instance-id", "snmp_host"]
        .iter()
        .map(|key| (*key).to_owned())
        .collect()
}

fn default_json_timestamp_units() -> String {
    "1s".to_owned()
}

/// Serializer configuration.
///
/// Covers the options needed by every format, and can be used to construct any of them. Options
/// that only apply to one format are ignored by the others.
#[derive(Clone, Debug, Deserialize)]
pub struct SerializerConfiguration {
    /// Wire format to serialize measurements into.
    ///
    /// Must be one of `wavefront` or `json`.
    pub data_format: String,

    /// Prefix prepended to every metric name.
    ///
    /// Only used by the Wavefront format. Defaults to the empty string.
    #[serde(default)]
    pub prefix: String,

    /// Tag key under which the original host value is preserved when a source override fires.
    ///
    /// Only used by the Wavefront format. Defaults to `telegraf_host`.
    #[serde(default)]
    pub host_tag: Option<String>,

    /// Tag keys eligible to become the `source` tag, in priority order.
    ///
    /// Only used by the Wavefront format. Defaults to the legacy identity tag list
    /// (`instanceid`, `instance-id`, `snmp_host`); set to an empty list to disable source
    /// overriding entirely.
    #[serde(default = "default_source_override")]
    pub source_override: Vec<String>,

    /// Units of the emitted timestamp, as a duration string such as `1s` or `10ms`.
    ///
    /// Only used by the JSON format. Rounded down to the nearest power of ten nanoseconds.
    /// Defaults to `1s`.
    #[serde(default = "default_json_timestamp_units")]
    pub json_timestamp_units: String,
}

impl SerializerConfiguration {
    /// Builds the configured serializer.
    ///
    /// # Errors
    ///
    /// If the configured data format is not recognized, or a format-specific option is invalid,
    /// an error is returned. An unrecognized format is always an error; it never falls back to a
    /// default format.
    pub fn build(&self) -> Result<Box<dyn Serializer + Send + Sync>, BuildError> {
        match self.data_format.as_str() {
            "wavefront" => Ok(Box::new(WavefrontSerializer::new(
                self.prefix.clone(),
                self.host_tag.clone(),
                self.source_override.clone(),
            ))),
            "json" => {
                let units_nanos = json::parse_timestamp_units(&self.json_timestamp_units)
                    .context(InvalidTimestampUnits {
                        units: self.json_timestamp_units.as_str(),
                    })?;
                Ok(Box::new(JsonSerializer::new(units_nanos)))
            }
            other => InvalidDataFormat { format: other }.fail(),
        }
    }
}
