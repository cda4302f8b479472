//! Plain-text rendering of query results

use lumen_core::{unique_labels, Timeseries};

/// One line per series: legend name, sample count and last value
pub fn summary_lines(series: &[Timeseries]) -> Vec<String> {
    if series.is_empty() {
        return vec!["no series returned".to_string()];
    }

    let keys = unique_labels(series);
    series
        .iter()
        .map(|s| {
            let last = s
                .last_value()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("{}\t{} samples\tlast={}", s.display_name(&keys), s.metrics.len(), last)
        })
        .collect()
}
