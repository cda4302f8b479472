//! Prometheus range-query client

use std::time::Instant;

use lumen_core::{format_timestamp, TimeRange, Timeseries};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{PrometheusConfig, RequestOptions};
use crate::grid::grid_bounds;
use crate::normalize::parse_query_range_response;
use crate::step::calculate_step;
use crate::{PrometheusError, Result};

pub const QUERY_RANGE_PATH: &str = "/prometheus/api/v1/query_range";

/// Query parameters sent to the `query_range` endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRangeParams {
    pub query: String,
    pub start: String,
    pub end: String,
    pub step: String,
}

impl QueryRangeParams {
    /// Compute step and grid-aligned bounds for `range`
    pub fn new(query: &str, range: &TimeRange) -> Result<Self> {
        let step = calculate_step(range);
        let bounds = grid_bounds(range, &step)?;

        Ok(Self {
            query: query.to_string(),
            start: format_timestamp(&bounds.from),
            end: format_timestamp(&bounds.to),
            step: step.to_string(),
        })
    }

    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("query", self.query.as_str()),
            ("start", self.start.as_str()),
            ("end", self.end.as_str()),
            ("step", self.step.as_str()),
        ]
    }
}

/// Build `{base_url}/prometheus/api/v1/query_range?{params}`
pub fn build_query_range_url(base_url: &str, query: &str, range: &TimeRange) -> Result<(Url, QueryRangeParams)> {
    let params = QueryRangeParams::new(query, range)?;
    let endpoint = format!("{}{}", base_url.trim_end_matches('/'), QUERY_RANGE_PATH);
    let url = Url::parse_with_params(&endpoint, params.pairs())
        .map_err(|e| PrometheusError::Config(format!("Invalid base URL {:?}: {}", base_url, e)))?;

    Ok((url, params))
}

/// Prometheus HTTP client.
///
/// Holds one connection pool for its lifetime. Every call is an
/// independent request: no caching, no retries. Dropping the returned
/// future cancels the request.
pub struct PrometheusClient {
    http: Client,
    config: PrometheusConfig,
}

impl PrometheusClient {
    pub fn new(config: PrometheusConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PrometheusConfig {
        &self.config
    }

    /// Run a range query against the configured base URL
    pub async fn query_range_with_defaults(&self, query: &str, range: &TimeRange) -> Result<Vec<Timeseries>> {
        self.query_range(query, range, &RequestOptions::from(&self.config)).await
    }

    /// Run a range query and map every result entry to a `Timeseries`.
    ///
    /// Fails on a non-success status, on a body that is not the expected
    /// `{ data: { result: [...] } }` shape, or on the first malformed entry.
    pub async fn query_range(
        &self,
        query: &str,
        range: &TimeRange,
        options: &RequestOptions,
    ) -> Result<Vec<Timeseries>> {
        let (url, params) = build_query_range_url(&options.base_url, query, range)?;

        debug!(
            query = %params.query,
            start = %params.start,
            end = %params.end,
            step = %params.step,
            "Sending Prometheus range query"
        );

        let mut request = self.http.get(url);
        for (name, value) in self.config.headers.iter().chain(options.headers.iter()) {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(token) = options
            .bearer_token
            .as_deref()
            .or(self.config.bearer_token.as_deref())
        {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let started = Instant::now();
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(query = %params.query, status = status.as_u16(), "Prometheus range query failed");
            return Err(PrometheusError::FetchFailed {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let body: Value = serde_json::from_slice(&body)
            .map_err(|e| PrometheusError::invalid(format!("response body is not valid JSON: {}", e)))?;
        let series = parse_query_range_response(&body)?;

        info!(
            query = %params.query,
            series = series.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prometheus range query completed"
        );

        Ok(series)
    }
}
