//! Series shaping helpers

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::domain::Timeseries;

/// Convert every sample to its share of the per-timestamp total, in percent.
///
/// Totals only include finite values; non-finite samples are left as they
/// are. A zero total maps every sample at that timestamp to `0`.
pub fn to_percentage(series: &[Timeseries]) -> Vec<Timeseries> {
    let mut totals: HashMap<DateTime<Utc>, f64> = HashMap::new();
    for metric in series.iter().flat_map(|s| s.metrics.iter()) {
        if metric.value.is_finite() {
            *totals.entry(metric.time).or_insert(0.0) += metric.value;
        }
    }

    series
        .iter()
        .map(|s| {
            let mut converted = s.clone();
            for metric in converted.metrics.iter_mut() {
                if !metric.value.is_finite() {
                    continue;
                }
                let total = totals.get(&metric.time).copied().unwrap_or(0.0);
                metric.value = if total == 0.0 {
                    0.0
                } else {
                    metric.value / total * 100.0
                };
            }
            converted
        })
        .collect()
}

/// Label keys whose values differ between at least two series, sorted.
///
/// A key missing from one series but present on another counts as
/// differing.
pub fn unique_labels(series: &[Timeseries]) -> Vec<String> {
    let Some((first, rest)) = series.split_first() else {
        return Vec::new();
    };

    let keys: BTreeSet<&String> = series.iter().flat_map(|s| s.labels.keys()).collect();

    keys.into_iter()
        .filter(|key| {
            let expected = first.labels.get(*key);
            rest.iter().any(|s| s.labels.get(*key) != expected)
        })
        .cloned()
        .collect()
}
