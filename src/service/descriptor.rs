//! Measurements query payloads.
//!
//! A measurements POST carries a result descriptor telling the service
//! which datasources to read, how to consolidate them, and which labels
//! to export. Descriptors are derived from a [`GraphConfig`] plus the
//! ordered metric selection.

use serde::Serialize;

use crate::data::graph::{AggregationFunction, GraphConfig};

/// One requested datasource within a result descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct Datasource {
    pub label: String,
    pub source: String,
    pub function: AggregationFunction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat: Option<String>,
}

/// The body of a measurements query.
#[derive(Debug, Clone, Serialize)]
pub struct ResultDescriptor {
    /// Sample interval, e.g. `"300s"`. Omitted when empty so the
    /// service default applies.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interval: String,
    pub datasources: Vec<Datasource>,
    /// Labels to include in the result set, in selection order.
    pub exports: Vec<String>,
}

impl ResultDescriptor {
    /// Derive a descriptor from a configuration and metric selection.
    ///
    /// The datasource `source` is always the metric's own name. A
    /// metric with no configured label is exported under its name;
    /// stored-empty labels and heartbeats count as unset here.
    pub fn from_config(config: &GraphConfig, metric_names: &[String]) -> Self {
        let mut datasources = Vec::with_capacity(metric_names.len());
        let mut exports = Vec::with_capacity(metric_names.len());

        for name in metric_names {
            let metric = config.metrics.get(name).cloned().unwrap_or_default();
            let label = metric
                .label
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| name.clone());

            exports.push(label.clone());
            datasources.push(Datasource {
                label,
                source: name.clone(),
                function: metric.function,
                heartbeat: metric.heartbeat.filter(|h| !h.is_empty()),
            });
        }

        Self {
            interval: config.interval.clone(),
            datasources,
            exports,
        }
    }
}
