//! Lumen Core - Shared time-series domain types
//!
//! This crate provides:
//! - Timestamp parsing and formatting (ISO-8601, always UTC)
//! - `TimeRange`, `Metric` and `Timeseries` records
//! - Series shaping helpers used by chart consumers
//! - Error handling utilities

pub mod domain;
pub mod error;
pub mod shaping;

pub use domain::*;
pub use error::{LumenError, Result};
pub use shaping::{to_percentage, unique_labels};
