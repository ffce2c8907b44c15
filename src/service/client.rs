//! HTTP client for the metrics service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{MetricsService, QueryBounds, ResultDescriptor, ServiceError};
use crate::data::{ResultSet, Sample, SearchResult};

/// Client for a Newts-style measurements API.
#[derive(Debug, Clone)]
pub struct MetricsClient {
    client: Client,
    endpoint: String,
}

impl MetricsClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> MetricsClientBuilder {
        MetricsClientBuilder::default()
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::BadRequest(body));
        }
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl MetricsService for MetricsClient {
    async fn measurements(
        &self,
        resource: &str,
        descriptor: &ResultDescriptor,
        resolution: Option<&str>,
        bounds: &QueryBounds,
    ) -> Result<ResultSet, ServiceError> {
        let url = measurements_url(&self.endpoint, resource, resolution, bounds);
        debug!(%url, "querying measurements");

        let response = self.client.post(&url).json(descriptor).send().await?;
        let response = Self::expect_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ServiceError> {
        let url = format!("{}/search", self.endpoint);
        debug!(%url, query, "searching resources");

        let response = self.client.get(&url).query(&[("q", query)]).send().await?;
        let response = Self::expect_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }

    async fn insert_samples(&self, samples: &[Sample]) -> Result<(), ServiceError> {
        let url = format!("{}/samples", self.endpoint);

        let response = self.client.post(&url).json(samples).send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}

/// Build a measurements URL with its optional query arguments.
fn measurements_url(
    endpoint: &str,
    resource: &str,
    resolution: Option<&str>,
    bounds: &QueryBounds,
) -> String {
    let mut url = format!("{}/measurements/{}", endpoint, urlencoded(resource));
    let mut args: Vec<String> = Vec::new();

    if let Some(resolution) = resolution.filter(|r| !r.is_empty()) {
        args.push(format!("resolution={resolution}"));
    }
    if let Some(start) = &bounds.start {
        args.push(format!("start={start}"));
    }
    if let Some(end) = &bounds.end {
        args.push(format!("end={end}"));
    }

    if !args.is_empty() {
        url.push('?');
        url.push_str(&args.join("&"));
    }

    url
}

// URL encode a resource id for use in paths
fn urlencoded(s: &str) -> String {
    s.replace('/', "%2F")
}

/// Builder for [`MetricsClient`].
#[derive(Debug, Default)]
pub struct MetricsClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl MetricsClientBuilder {
    /// Set the service endpoint (e.g. "http://localhost:8080").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> MetricsClient {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(30));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        MetricsClient {
            client,
            endpoint: self
                .endpoint
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = MetricsClient::builder().build();
        assert_eq!(client.endpoint(), "http://localhost:8080");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = MetricsClient::builder()
            .endpoint("http://metrics.local:8080/")
            .build();
        assert_eq!(client.endpoint(), "http://metrics.local:8080");
    }

    #[test]
    fn test_measurements_url_without_arguments() {
        let url = measurements_url(
            "http://localhost:8080",
            "localhost",
            None,
            &QueryBounds::default(),
        );
        assert_eq!(url, "http://localhost:8080/measurements/localhost");
    }

    #[test]
    fn test_measurements_url_with_all_arguments() {
        let bounds = QueryBounds {
            start: Some("2026-08-01T00:00:00.000Z".to_string()),
            end: Some("2026-08-07T00:00:00.000Z".to_string()),
        };
        let url = measurements_url("http://localhost:8080", "localhost", Some("15m"), &bounds);
        assert_eq!(
            url,
            "http://localhost:8080/measurements/localhost\
             ?resolution=15m\
             &start=2026-08-01T00:00:00.000Z\
             &end=2026-08-07T00:00:00.000Z"
        );
    }

    #[test]
    fn test_measurements_url_skips_empty_resolution() {
        let url = measurements_url(
            "http://localhost:8080",
            "localhost",
            Some(""),
            &QueryBounds::default(),
        );
        assert_eq!(url, "http://localhost:8080/measurements/localhost");
    }

    #[test]
    fn test_urlencoded_resource_path() {
        assert_eq!(urlencoded("hosts/web-1"), "hosts%2Fweb-1");
        assert_eq!(urlencoded("simple"), "simple");
    }
}
