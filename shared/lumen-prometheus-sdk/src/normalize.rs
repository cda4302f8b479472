//! Mapping of `query_range` responses onto `Timeseries`
//!
//! Validation is fail-fast: the first malformed entry aborts the whole
//! response and no partial result is returned.

use std::collections::BTreeMap;

use lumen_core::{timestamp_from_millis, Metric, Timeseries};
use serde_json::Value;

use crate::{PrometheusError, Result};

const NAME_LABEL: &str = "__name__";

/// Map a full `query_range` response body. Expects
/// `{ "data": { "result": [ ... ] } }`.
pub fn parse_query_range_response(body: &Value) -> Result<Vec<Timeseries>> {
    let root = body
        .as_object()
        .ok_or_else(|| PrometheusError::invalid("response body is not an object"))?;
    let data = root
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| PrometheusError::invalid("response is missing the data object"))?;
    let result = data
        .get("result")
        .and_then(Value::as_array)
        .ok_or_else(|| PrometheusError::invalid("data.result is missing or not an array"))?;

    result
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            normalize_entry(entry).map_err(|e| match e {
                PrometheusError::InvalidResponse(msg) => {
                    PrometheusError::InvalidResponse(format!("result[{}]: {}", index, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Convert one result entry, `{ "metric": {...}, "values": [[ts, "v"], ...] }`
pub fn normalize_entry(entry: &Value) -> Result<Timeseries> {
    let entry = entry
        .as_object()
        .ok_or_else(|| PrometheusError::invalid("entry is not an object"))?;
    let metric = entry
        .get("metric")
        .and_then(Value::as_object)
        .ok_or_else(|| PrometheusError::invalid("entry is missing the metric object"))?;
    let values = entry
        .get("values")
        .and_then(Value::as_array)
        .ok_or_else(|| PrometheusError::invalid("entry is missing the values array"))?;

    let mut name = String::new();
    let mut labels = BTreeMap::new();
    for (key, value) in metric {
        let value = value.as_str().ok_or_else(|| {
            PrometheusError::invalid(format!("label {:?} has a non-string value {}", key, value))
        })?;
        if key == NAME_LABEL {
            name = value.to_string();
        } else {
            labels.insert(key.clone(), value.to_string());
        }
    }

    let metrics = values
        .iter()
        .map(normalize_sample)
        .collect::<Result<Vec<_>>>()?;

    Ok(Timeseries::new(name, labels, metrics))
}

fn normalize_sample(sample: &Value) -> Result<Metric> {
    let pair = match sample.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => {
            return Err(PrometheusError::invalid(format!(
                "malformed value pair {}, expected [unixSeconds, \"value\"]",
                sample
            )))
        }
    };

    let seconds = pair[0].as_f64().ok_or_else(|| {
        PrometheusError::invalid(format!("malformed value pair: timestamp {} is not a number", pair[0]))
    })?;
    let raw = pair[1].as_str().ok_or_else(|| {
        PrometheusError::invalid(format!("malformed value pair: value {} is not a string", pair[1]))
    })?;
    let value: f64 = raw.parse().map_err(|_| {
        PrometheusError::invalid(format!("malformed value pair: {:?} is not a float", raw))
    })?;

    let out_of_range = || {
        PrometheusError::invalid(format!("malformed value pair: timestamp {} is out of range", pair[0]))
    };
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(out_of_range());
    }
    let time = timestamp_from_millis(millis as i64).map_err(|_| out_of_range())?;
    Ok(Metric::new(time, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::format_timestamp;
    use serde_json::json;

    #[test]
    fn test_normalize_well_formed_entry() {
        let entry = json!({
            "metric": { "__name__": "up", "job": "x" },
            "values": [[1000, "1"]]
        });
        let series = normalize_entry(&entry).unwrap();

        assert_eq!(series.name, "up");
        assert_eq!(series.labels.len(), 1);
        assert_eq!(series.labels["job"], "x");
        assert!(series.visible);
        assert_eq!(series.metrics.len(), 1);
        assert_eq!(format_timestamp(&series.metrics[0].time), "1970-01-01T00:16:40.000Z");
        assert_eq!(series.metrics[0].value, 1.0);
        assert!(series.metrics[0].attributes.is_empty());
        assert!(series.metrics[0].resource.is_empty());
    }

    #[test]
    fn test_missing_name_defaults_to_empty() {
        let entry = json!({ "metric": { "job": "x" }, "values": [] });
        let series = normalize_entry(&entry).unwrap();

        assert_eq!(series.name, "");
        assert!(series.metrics.is_empty());
    }

    #[test]
    fn test_fractional_timestamps_and_special_values() {
        let entry = json!({
            "metric": {},
            "values": [[1689696015.5, "2.25"], [1689696016, "NaN"], [1689696017, "+Inf"]]
        });
        let series = normalize_entry(&entry).unwrap();

        assert_eq!(format_timestamp(&series.metrics[0].time), "2023-07-18T16:00:15.500Z");
        assert_eq!(series.metrics[0].value, 2.25);
        assert!(series.metrics[1].value.is_nan());
        assert_eq!(series.metrics[2].value, f64::INFINITY);
    }

    #[test]
    fn test_non_string_label_is_rejected() {
        let entry = json!({ "metric": { "job": 5 }, "values": [] });
        let err = normalize_entry(&entry).unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().contains("job"));
    }

    #[test]
    fn test_structural_failures() {
        let cases = [
            (json!("up"), "not an object"),
            (json!({ "values": [] }), "metric"),
            (json!({ "metric": [], "values": [] }), "metric"),
            (json!({ "metric": {} }), "values"),
            (json!({ "metric": {}, "values": [[1000]] }), "malformed value pair"),
            (json!({ "metric": {}, "values": [[1000, "1", "2"]] }), "malformed value pair"),
            (json!({ "metric": {}, "values": [["1000", "1"]] }), "timestamp"),
            (json!({ "metric": {}, "values": [[1000, 1]] }), "not a string"),
            (json!({ "metric": {}, "values": [[1000, "abc"]] }), "not a float"),
            (json!({ "metric": {}, "values": [[1e300, "1"]] }), "is out of range"),
            (json!({ "metric": {}, "values": [[9.0e15, "1"]] }), "out of range"),
        ];

        for (entry, expected) in cases {
            let err = normalize_entry(&entry).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{} should mention {:?}, got {}",
                entry,
                expected,
                err
            );
        }
    }

    #[test]
    fn test_response_shape_failures() {
        let cases = [
            (json!([]), "not an object"),
            (json!({}), "data"),
            (json!({ "data": "nope" }), "data"),
            (json!({ "data": {} }), "data.result"),
            (json!({ "data": { "result": {} } }), "data.result"),
        ];

        for (body, expected) in cases {
            let err = parse_query_range_response(&body).unwrap_err();
            assert!(err.is_validation());
            assert!(err.to_string().contains(expected), "{}", err);
        }
    }

    #[test]
    fn test_one_bad_entry_aborts_the_response() {
        let body = json!({
            "data": {
                "result": [
                    { "metric": { "__name__": "up" }, "values": [[1000, "1"]] },
                    { "metric": { "__name__": "up", "job": 5 }, "values": [] }
                ]
            }
        });
        let err = parse_query_range_response(&body).unwrap_err();

        assert!(err.to_string().contains("result[1]"));
    }

    #[test]
    fn test_out_of_range_timestamp_is_a_validation_error() {
        let body = json!({
            "data": {
                "result": [
                    { "metric": { "__name__": "up" }, "values": [[1000, "1"]] },
                    { "metric": { "__name__": "up" }, "values": [[1e300, "1"]] }
                ]
            }
        });
        let err = parse_query_range_response(&body).unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().contains("result[1]"));
        assert!(err.to_string().contains("out of range"));
        assert!(!err.to_string().contains(&i64::MAX.to_string()));
    }

    #[test]
    fn test_response_keeps_result_order() {
        let body = json!({
            "status": "success",
            "data": {
                "resultType": "matrix",
                "result": [
                    { "metric": { "__name__": "b" }, "values": [] },
                    { "metric": { "__name__": "a" }, "values": [] }
                ]
            }
        });
        let series = parse_query_range_response(&body).unwrap();
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["b", "a"]);
    }
}
