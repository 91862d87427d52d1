//! Wavefront data format serializer.
//!
//! Emits one line per measurement field in the Wavefront line format:
//!
//! ```text
//! <name> <value> <epoch-seconds> <tag1="v1"> <tag2="v2"> ...
//! ```
//!
//! Metric names and tag keys are sanitized to the characters Wavefront accepts, and the generic
//! `host` tag convention is remapped to Wavefront's `source` identity tag, with a configurable
//! priority list of alternate identity tags that can take its place. A measurement without a
//! `host` tag produces no `source` tag at all, where telegraf's encoder would emit `source=""`.

use std::collections::HashMap;

use anyhow::anyhow;
use tracing::error;
use wireline_event::{FieldValue, Measurement};

use crate::{GenericError, Serializer};

/// Tag key under which the original host value is preserved when a source override fires and no
/// host tag key was configured.
const DEFAULT_HOST_TAG: &str = "telegraf_host";

const METRIC_SEPARATOR: char = '.';

// Catches many of the invalid characters that could appear in a metric or tag name.
const SANITIZED_CHARS: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '+', '`', '\'', '"', '[', ']', '{', '}', ':',
    ';', '<', '>', ',', '?', '/', '\\', '|', ' ', '=',
];

/// Wavefront line format serializer.
///
/// A serializer instance holds three pieces of configuration, all immutable after construction: a
/// prefix prepended to every metric name, the tag key under which an overridden host value is
/// preserved, and the priority-ordered list of tag keys eligible to become the `source` tag.
#[derive(Clone, Debug)]
pub struct WavefrontSerializer {
    prefix: String,
    host_tag: String,
    source_override: Vec<String>,
}

impl WavefrontSerializer {
    /// Creates a new `WavefrontSerializer`.
    ///
    /// When `host_tag` is `None`, the overridden host value is preserved under `telegraf_host`.
    pub fn new(prefix: String, host_tag: Option<String>, source_override: Vec<String>) -> Self {
        Self {
            prefix,
            host_tag: host_tag.unwrap_or_else(|| DEFAULT_HOST_TAG.to_owned()),
            source_override,
        }
    }

    /// Transforms a measurement's tag set into its formatted, sorted wire representation.
    ///
    /// The first configured override key present in the tag set wins: its value becomes the
    /// `source` tag, the original `host` value moves under the configured host tag key, and the
    /// matched tag is dropped. Without a match, the `host` value itself becomes `source`. The
    /// `host` tag never appears in the output, and an absent `host` tag simply produces no
    /// `source` entry.
    fn build_tags(&self, measurement_tags: &HashMap<String, String>) -> Vec<String> {
        // Work on a private copy. The measurement's own tag map must stay untouched so that one
        // measurement can be serialized concurrently by multiple serializers.
        let mut tags = measurement_tags.clone();

        if let Some(key) = self
            .source_override
            .iter()
            .find(|key| tags.contains_key(key.as_str()))
        {
            let host_value = tags.get("host").cloned();
            if let Some(source) = tags.remove(key.as_str()) {
                tags.insert("source".to_owned(), source);
            }
            if let Some(host_value) = host_value {
                tags.insert(self.host_tag.clone(), host_value);
            }
        } else if let Some(host_value) = tags.get("host").cloned() {
            tags.insert("source".to_owned(), host_value);
        }
        tags.remove("host");

        let mut formatted = tags
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", sanitize_name(key), sanitize_tag_value(value)))
            .collect::<Vec<_>>();

        // Lexicographic order keeps the joined tag string identical across calls regardless of
        // the tag map's iteration order.
        formatted.sort_unstable();
        formatted
    }
}

impl Serializer for WavefrontSerializer {
    fn serialize(&self, measurement: &Measurement) -> Result<Vec<u8>, GenericError> {
        let mut out = Vec::new();

        // The tag transformation depends only on the measurement's tag set, never on a field, so
        // it is computed once and shared by every line.
        let tags = self.build_tags(measurement.tags()).join(" ");
        let timestamp = measurement.timestamp_secs();

        // Sorted for stable line order across calls.
        let mut fields = measurement.fields().iter().collect::<Vec<_>>();
        fields.sort_unstable_by(|a, b| a.0.cmp(b.0));

        for (field_name, field_value) in fields {
            // A field literally named "value" carries the metric's sole value and does not
            // suffix the metric name.
            let name = if field_name == "value" {
                format!("{}{}", self.prefix, measurement.name())
            } else {
                format!(
                    "{}{}{}{}",
                    self.prefix,
                    measurement.name(),
                    METRIC_SEPARATOR,
                    field_name
                )
            };
            let name = sanitize_metric_name(&name);

            let value = match build_value(field_value, &name) {
                Ok(value) => value,
                Err(e) => {
                    error!(error = %e, "Skipping field with unserializable value.");
                    continue;
                }
            };

            let line = format!("{} {} {} {}\n", name, value, timestamp, tags);
            out.extend_from_slice(line.as_bytes());
        }

        Ok(out)
    }
}

/// Formats a single field value for the wire.
///
/// Booleans become `1.0`/`0.0`, integers their plain decimal form, and floats fixed-point
/// notation with exactly six fractional digits. Text values are not representable and produce an
/// error naming the type, value, and metric the field belongs to.
fn build_value(value: &FieldValue, name: &str) -> Result<String, GenericError> {
    match value {
        FieldValue::Boolean(true) => Ok("1.0".to_owned()),
        FieldValue::Boolean(false) => Ok("0.0".to_owned()),
        FieldValue::Integer(v) => Ok(v.to_string()),
        FieldValue::Unsigned(v) => Ok(v.to_string()),
        FieldValue::Float(v) => Ok(format!("{:.6}", v)),
        other => Err(anyhow!(
            "unexpected type: {}, with value: {}, for: {}",
            other.type_name(),
            other,
            name
        )),
    }
}

/// Replaces characters that are invalid in a metric or tag name with `-`.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if SANITIZED_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// Sanitizes a metric name: invalid characters become `-`, then underscores become path
/// separators, matching the literal `.` used between measurement and field name.
fn sanitize_metric_name(name: &str) -> String {
    sanitize_name(name).replace('_', ".")
}

/// Sanitizes a tag value: embedded double quotes are escaped and `*` is replaced with `-`.
fn sanitize_tag_value(value: &str) -> String {
    value.replace('"', "\\\"").replace('*', "-")
}
