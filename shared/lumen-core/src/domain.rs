//! Time-series domain types

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LumenError, Result};

/// OpenTelemetry-style attribute or resource map
pub type Attributes = HashMap<String, serde_json::Value>;

/// Parse an ISO-8601 timestamp and normalize it to UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| LumenError::InvalidTimestamp(format!("{:?}: {}", value, e)))
}

/// Format a timestamp as ISO-8601 with millisecond precision, e.g.
/// `2023-07-18T16:00:00.000Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build a UTC timestamp from milliseconds since the Unix epoch
pub fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| LumenError::InvalidTimestamp(format!("{} ms is out of range", millis)))
}

/// Seconds since the Unix epoch, fractional part included
pub fn epoch_seconds(ts: &DateTime<Utc>) -> f64 {
    ts.timestamp_millis() as f64 / 1000.0
}

/// Serde adapter that writes timestamps the way `format_timestamp` does
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// A closed time interval. `from <= to` is assumed, not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "iso8601")]
    pub from: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Parse both ends from ISO-8601 strings
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            from: parse_timestamp(from)?,
            to: parse_timestamp(to)?,
        })
    }

    /// The range of the given length ending now
    pub fn last(duration: Duration) -> Self {
        let to = Utc::now();
        Self {
            from: to - duration,
            to,
        }
    }

    /// Length of the range in seconds. Negative if `from > to`.
    pub fn duration_secs(&self) -> f64 {
        epoch_seconds(&self.to) - epoch_seconds(&self.from)
    }
}

/// A single timestamped sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    #[serde(with = "iso8601")]
    pub time: DateTime<Utc>,
    pub value: f64,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub resource: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<Vec<u8>>,
}

impl Metric {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self {
            time,
            value,
            attributes: Attributes::new(),
            resource: Attributes::new(),
            trace_id: None,
            span_id: None,
        }
    }
}

/// A named, labeled sequence of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeseries {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub metrics: Vec<Metric>,
    /// Presentation toggle, owned by the UI once the series is handed out
    pub visible: bool,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub resource: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<Vec<u8>>,
}

impl Timeseries {
    /// Create a freshly ingested series. Always starts out visible.
    pub fn new(name: String, labels: BTreeMap<String, String>, metrics: Vec<Metric>) -> Self {
        Self {
            name,
            labels,
            metrics,
            visible: true,
            attributes: Attributes::new(),
            resource: Attributes::new(),
            trace_id: None,
            span_id: None,
        }
    }

    /// Legend name built from the series name and the given label keys.
    ///
    /// Pass the output of [`crate::unique_labels`] so that only labels
    /// which tell series apart end up in the legend. With no keys the
    /// bare name is used, or the full label set when the name is empty.
    pub fn display_name(&self, keys: &[String]) -> String {
        let selected: Vec<(&String, &String)> = if keys.is_empty() {
            if !self.name.is_empty() {
                return self.name.clone();
            }
            self.labels.iter().collect()
        } else {
            keys.iter()
                .filter_map(|key| self.labels.get_key_value(key))
                .collect()
        };

        if selected.is_empty() {
            return self.name.clone();
        }

        let rendered: Vec<String> = selected
            .into_iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, value))
            .collect();
        format!("{}{{{}}}", self.name, rendered.join(", "))
    }

    pub fn last_value(&self) -> Option<f64> {
        self.metrics.last().map(|m| m.value)
    }
}
