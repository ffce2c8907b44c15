//! The metrics service seam.
//!
//! Everything the dashboard needs from the remote service is behind the
//! [`MetricsService`] trait: a measurements query, free-text search,
//! and sample insertion. [`MetricsClient`] is the HTTP implementation;
//! tests substitute stubs.

mod client;
mod descriptor;

pub use client::MetricsClient;
pub use descriptor::{Datasource, ResultDescriptor};

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

use crate::data::graph::TimeRange;
use crate::data::{ResultSet, Sample, SearchResult};

/// Errors that can occur talking to the metrics service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service rejected the query as malformed (HTTP 400). Callers
    /// surface this as "show the configuration form" rather than a
    /// hard failure.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Any other non-success status.
    #[error("request failed with status {0}")]
    Status(u16),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for a response.
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(String),

    /// Failed to parse the response body.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A configured range bound could not be understood.
    #[error("invalid time bound: {0}")]
    InvalidBound(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_connect() {
            ServiceError::Connection(err.to_string())
        } else {
            ServiceError::Http(err.to_string())
        }
    }
}

/// Time bounds for a measurements query, normalised to ISO-8601 UTC.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBounds {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl QueryBounds {
    /// Normalise a configured [`TimeRange`] into query bounds.
    ///
    /// Each bound may be an RFC-3339 timestamp or an epoch-milliseconds
    /// integer; empty or unset bounds are simply omitted. Anything else
    /// is an [`ServiceError::InvalidBound`].
    pub fn from_range(range: &TimeRange) -> Result<Self, ServiceError> {
        Ok(Self {
            start: normalise_bound(range.start.as_deref())?,
            end: normalise_bound(range.end.as_deref())?,
        })
    }
}

fn normalise_bound(bound: Option<&str>) -> Result<Option<String>, ServiceError> {
    let Some(raw) = bound else { return Ok(None) };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let instant: DateTime<Utc> = if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        parsed.with_timezone(&Utc)
    } else if let Ok(millis) = raw.parse::<i64>() {
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| ServiceError::InvalidBound(raw.to_string()))?
    } else {
        return Err(ServiceError::InvalidBound(raw.to_string()));
    };

    Ok(Some(instant.to_rfc3339_opts(SecondsFormat::Millis, true)))
}

/// Operations the dashboard consumes from the remote metrics service.
#[async_trait]
pub trait MetricsService: Send + Sync + Debug {
    /// Query aggregated measurements for a resource.
    async fn measurements(
        &self,
        resource: &str,
        descriptor: &ResultDescriptor,
        resolution: Option<&str>,
        bounds: &QueryBounds,
    ) -> Result<ResultSet, ServiceError>;

    /// Free-text search for resources and their metric names.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ServiceError>;

    /// Upload raw samples.
    async fn insert_samples(&self, samples: &[Sample]) -> Result<(), ServiceError>;
}
