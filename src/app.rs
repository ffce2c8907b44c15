//! Graph session orchestration.
//!
//! An [`App`] owns the injected service and store and walks one
//! resource selection through the full cycle: build or restore its
//! configuration, derive a query descriptor, persist, query, and
//! reshape the response into chartable series.

use anyhow::{bail, Result};
use tracing::debug;

use crate::data::{build_or_restore, persist, to_series, GraphConfig, SearchResult, Series};
use crate::service::{MetricsService, QueryBounds, ResultDescriptor, ServiceError};
use crate::store::KeyValueStore;

/// What a draw produced.
#[derive(Debug)]
pub enum DrawOutcome {
    /// Series ready for a charting sink, in selection order.
    Plotted(Vec<Series>),
    /// The service rejected the query as malformed; the caller should
    /// surface the configuration form instead of an error. Carries the
    /// service's complaint.
    ConfigRequired(String),
}

/// One graph session against a metrics service and a durable store.
pub struct App {
    service: Box<dyn MetricsService>,
    store: Box<dyn KeyValueStore>,
    resource: Option<String>,
    metrics: Vec<String>,
    /// Configuration for the current selection. Mutate freely between
    /// draws; every draw persists it.
    pub config: GraphConfig,
}

impl App {
    /// Create a new session over the given service and store.
    pub fn new(service: Box<dyn MetricsService>, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            service,
            store,
            resource: None,
            metrics: Vec::new(),
            config: GraphConfig::default(),
        }
    }

    /// The currently selected resource, if any.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// The currently selected metric names, in selection order.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Select a resource and its metrics, restoring any persisted
    /// configuration for that resource.
    pub fn select(&mut self, resource: &str, metric_names: Vec<String>) {
        self.config = build_or_restore(self.store.as_ref(), resource, &metric_names);
        self.resource = Some(resource.to_string());
        self.metrics = metric_names;
    }

    /// Pass-through to the service's free-text search.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ServiceError> {
        self.service.search(query).await
    }

    /// Query the service with the current configuration and reshape the
    /// response into series.
    ///
    /// The configuration is persisted on every draw, before the
    /// response is known, so a rejected query still leaves the form
    /// state saved for the next session. A 400 response becomes
    /// [`DrawOutcome::ConfigRequired`]; other failures propagate.
    pub async fn draw(&mut self) -> Result<DrawOutcome> {
        let Some(resource) = self.resource.clone() else {
            bail!("no resource selected");
        };

        let descriptor = ResultDescriptor::from_config(&self.config, &self.metrics);
        let bounds = QueryBounds::from_range(&self.config.range)?;

        persist(self.store.as_mut(), &resource, &self.config, &self.metrics);

        let resolution = match self.config.resolution.as_str() {
            "" => None,
            resolution => Some(resolution),
        };

        match self
            .service
            .measurements(&resource, &descriptor, resolution, &bounds)
            .await
        {
            Ok(results) => Ok(DrawOutcome::Plotted(to_series(
                &results,
                Some(&descriptor.exports),
            ))),
            Err(ServiceError::BadRequest(reason)) => {
                debug!(resource = %resource, reason = %reason, "query rejected, configuration required");
                Ok(DrawOutcome::ConfigRequired(reason))
            }
            Err(e) => Err(e.into()),
        }
    }
}
