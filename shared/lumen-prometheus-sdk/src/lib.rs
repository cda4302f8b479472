//! Prometheus SDK for the Lumen Platform
//!
//! Fetches range queries from a Prometheus-compatible API and turns them
//! into `lumen_core::Timeseries` records:
//!
//! - [`calculate_step`] picks a step so a range yields about 120 points
//! - [`round_to_grid`] aligns range bounds to that step
//! - [`normalize_entry`] validates one `query_range` result entry
//! - [`PrometheusClient`] ties it together over HTTP

mod client;
mod config;
mod error;
mod grid;
mod normalize;
mod step;


pub use client::{build_query_range_url, PrometheusClient, QueryRangeParams, QUERY_RANGE_PATH};
pub use config::{PrometheusConfig, RequestOptions};
pub use error::{PrometheusError, Result};
pub use grid::{grid_bounds, round_to_grid};
pub use normalize::{normalize_entry, parse_query_range_response};
pub use step::{calculate_step, Step, StepUnit, TARGET_POINTS};

/// Re-export for convenience
pub mod prelude {
    pub use super::{PrometheusClient, PrometheusConfig, PrometheusError, RequestOptions, Result};
    pub use lumen_core::{Metric, TimeRange, Timeseries};
}
