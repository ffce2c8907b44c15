//! Graph configuration and its persistence.
//!
//! A [`GraphConfig`] captures everything needed to re-issue a
//! measurements query for one resource: interval, resolution, time
//! range, and per-metric settings. Configurations are persisted to an
//! injected [`KeyValueStore`] as one flat entry per field, namespaced
//! by resource, so the same selection restores identically on the next
//! session.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::KeyValueStore;

/// Aggregation applied by the service when consolidating samples into
/// measurement windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationFunction {
    Min,
    #[default]
    Average,
    Max,
}

impl AggregationFunction {
    /// Every selectable function, in display order.
    pub const ALL: [AggregationFunction; 3] = [
        AggregationFunction::Min,
        AggregationFunction::Average,
        AggregationFunction::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationFunction::Min => "MIN",
            AggregationFunction::Average => "AVERAGE",
            AggregationFunction::Max => "MAX",
        }
    }
}

impl fmt::Display for AggregationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MIN" => Ok(AggregationFunction::Min),
            "AVERAGE" => Ok(AggregationFunction::Average),
            "MAX" => Ok(AggregationFunction::Max),
            other => Err(format!("unknown aggregation function: {other}")),
        }
    }
}

/// Per-metric settings within a graph configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Display name the metric is exported under.
    pub label: Option<String>,
    /// Underlying metric key.
    pub source: Option<String>,
    /// Consolidation function, `AVERAGE` unless configured otherwise.
    pub function: AggregationFunction,
    /// Staleness tolerance, passed through to the service opaquely.
    pub heartbeat: Option<String>,
}

/// Requested time bounds for a query.
///
/// Bounds are kept as the strings the user entered. `None` means the
/// bound was never stored; `Some("")` means it was stored empty. The
/// distinction matters on restore, where an empty string counts as a
/// stored value rather than falling back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Everything needed to draw a graph for one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub interval: String,
    pub resolution: String,
    pub range: TimeRange,
    pub metrics: HashMap<String, MetricConfig>,
}

impl GraphConfig {
    /// A fresh configuration for the given metric selection: empty
    /// interval and resolution, unset range, `AVERAGE` everywhere.
    pub fn with_defaults(metric_names: &[String]) -> Self {
        let metrics = metric_names
            .iter()
            .map(|name| (name.clone(), MetricConfig::default()))
            .collect();
        Self {
            interval: String::new(),
            resolution: String::new(),
            range: TimeRange::default(),
            metrics,
        }
    }
}

/// Format the persistence key for a field of a resource's configuration.
fn key_for(resource: &str, field: &str) -> String {
    format!("{resource}:{field}")
}

fn retrieve(store: &dyn KeyValueStore, resource: &str, field: &str) -> Option<String> {
    store.get(&key_for(resource, field))
}

/// Build a configuration for `resource`, restoring any persisted state.
///
/// Starts from [`GraphConfig::with_defaults`] and overwrites each field
/// that has a stored value under the resource's namespace. Fields with
/// no stored value keep their defaults. If the store is unavailable the
/// defaults are returned as-is, with a warning.
pub fn build_or_restore(
    store: &dyn KeyValueStore,
    resource: &str,
    metric_names: &[String],
) -> GraphConfig {
    let mut config = GraphConfig::with_defaults(metric_names);

    if !store.available() {
        warn!(resource, "cannot restore graph configuration: durable store unavailable");
        return config;
    }

    if let Some(interval) = retrieve(store, resource, "_interval") {
        config.interval = interval;
    }
    if let Some(resolution) = retrieve(store, resource, "_resolution") {
        config.resolution = resolution;
    }
    config.range.start = retrieve(store, resource, "_range.start");
    config.range.end = retrieve(store, resource, "_range.end");

    for name in metric_names {
        let metric = config.metrics.entry(name.clone()).or_default();
        metric.label = retrieve(store, resource, &format!("{name}.label"));
        metric.source = retrieve(store, resource, &format!("{name}.source"));
        metric.heartbeat = retrieve(store, resource, &format!("{name}.heartbeat"));
        metric.function = match retrieve(store, resource, &format!("{name}.function")) {
            Some(stored) => stored.parse().unwrap_or_else(|_| {
                warn!(resource, metric = %name, stored = %stored, "unrecognised stored function, using AVERAGE");
                AggregationFunction::default()
            }),
            None => AggregationFunction::default(),
        };
    }

    config
}

/// Persist a configuration under the resource's namespace.
///
/// Every field is written, one key per field per metric. Absent values
/// are written as empty strings, so a later restore sees a stored empty
/// value rather than falling back to the default. The `source` field is
/// normalised to the metric's own name, whatever the configuration
/// carries. If the store is unavailable nothing is written.
///
/// Writes are individual, fire-and-forget `set` calls; there is no
/// atomicity across the keys of one configuration.
pub fn persist(
    store: &mut dyn KeyValueStore,
    resource: &str,
    config: &GraphConfig,
    metric_names: &[String],
) {
    if !store.available() {
        warn!(resource, "cannot persist graph configuration: durable store unavailable");
        return;
    }

    store.set(&key_for(resource, "_interval"), &config.interval);
    store.set(&key_for(resource, "_resolution"), &config.resolution);
    store.set(
        &key_for(resource, "_range.start"),
        config.range.start.as_deref().unwrap_or(""),
    );
    store.set(
        &key_for(resource, "_range.end"),
        config.range.end.as_deref().unwrap_or(""),
    );

    for name in metric_names {
        let metric = config.metrics.get(name).cloned().unwrap_or_default();

        store.set(
            &key_for(resource, &format!("{name}.label")),
            metric.label.as_deref().unwrap_or(""),
        );
        // The source key is the metric's identity, not a free-form override
        store.set(&key_for(resource, &format!("{name}.source")), name);
        store.set(
            &key_for(resource, &format!("{name}.function")),
            metric.function.as_str(),
        );
        store.set(
            &key_for(resource, &format!("{name}.heartbeat")),
            metric.heartbeat.as_deref().unwrap_or(""),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_function_round_trips_through_strings() {
        for function in AggregationFunction::ALL {
            assert_eq!(function.as_str().parse::<AggregationFunction>(), Ok(function));
        }
        assert!("MEDIAN".parse::<AggregationFunction>().is_err());
    }

    #[test]
    fn test_fresh_store_yields_defaults() {
        let store = MemoryStore::new();
        let metrics = names(&["ifInOctets", "ifOutOctets"]);

        let config = build_or_restore(&store, "localhost", &metrics);

        assert_eq!(config.interval, "");
        assert_eq!(config.resolution, "");
        assert_eq!(config.range.start, None);
        assert_eq!(config.range.end, None);
        for name in &metrics {
            let metric = &config.metrics[name];
            assert_eq!(metric.function, AggregationFunction::Average);
            assert_eq!(metric.label, None);
            assert_eq!(metric.source, None);
            assert_eq!(metric.heartbeat, None);
        }
    }

    #[test]
    fn test_unavailable_store_yields_defaults() {
        let store = MemoryStore::detached();
        let metrics = names(&["temperature"]);

        let config = build_or_restore(&store, "sensor-1", &metrics);
        assert_eq!(config.metrics["temperature"].function, AggregationFunction::Average);
        assert_eq!(config.range.start, None);
    }

    #[test]
    fn test_persist_to_unavailable_store_writes_nothing() {
        let mut store = MemoryStore::detached();
        let metrics = names(&["temperature"]);
        let config = GraphConfig::with_defaults(&metrics);

        persist(&mut store, "sensor-1", &config, &metrics);
        assert!(store.is_empty());
    }

    #[test]
    fn test_persist_then_restore_round_trips() {
        let mut store = MemoryStore::new();
        let metrics = names(&["ifInOctets"]);

        let mut config = GraphConfig::with_defaults(&metrics);
        config.interval = "300s".to_string();
        config.resolution = "15m".to_string();
        config.range.start = Some("2026-08-01T00:00:00Z".to_string());
        config.range.end = Some("2026-08-07T00:00:00Z".to_string());
        {
            let metric = config.metrics.get_mut("ifInOctets").unwrap();
            metric.label = Some("in".to_string());
            metric.function = AggregationFunction::Max;
            metric.heartbeat = Some("600s".to_string());
        }

        persist(&mut store, "localhost", &config, &metrics);
        let restored = build_or_restore(&store, "localhost", &metrics);

        assert_eq!(restored.interval, "300s");
        assert_eq!(restored.resolution, "15m");
        assert_eq!(restored.range.start.as_deref(), Some("2026-08-01T00:00:00Z"));
        assert_eq!(restored.range.end.as_deref(), Some("2026-08-07T00:00:00Z"));

        let metric = &restored.metrics["ifInOctets"];
        assert_eq!(metric.label.as_deref(), Some("in"));
        assert_eq!(metric.function, AggregationFunction::Max);
        assert_eq!(metric.heartbeat.as_deref(), Some("600s"));
        // Restored source is the persisted identity key
        assert_eq!(metric.source.as_deref(), Some("ifInOctets"));
    }

    #[test]
    fn test_unset_fields_restore_as_stored_empty_strings() {
        let mut store = MemoryStore::new();
        let metrics = names(&["temperature"]);
        let config = GraphConfig::with_defaults(&metrics);

        persist(&mut store, "sensor-1", &config, &metrics);
        let restored = build_or_restore(&store, "sensor-1", &metrics);

        // A persisted default is an empty string, not an absent key
        assert_eq!(restored.range.start.as_deref(), Some(""));
        assert_eq!(restored.range.end.as_deref(), Some(""));
        assert_eq!(restored.metrics["temperature"].label.as_deref(), Some(""));
        assert_eq!(restored.metrics["temperature"].heartbeat.as_deref(), Some(""));
    }

    #[test]
    fn test_source_persists_as_metric_name_not_configured_value() {
        let mut store = MemoryStore::new();
        let metrics = names(&["ifInOctets"]);

        let mut config = GraphConfig::with_defaults(&metrics);
        config.metrics.get_mut("ifInOctets").unwrap().source = Some("edited-away".to_string());

        persist(&mut store, "localhost", &config, &metrics);

        assert_eq!(
            store.get("localhost:ifInOctets.source").as_deref(),
            Some("ifInOctets")
        );
    }

    #[test]
    fn test_resources_do_not_collide() {
        let mut store = MemoryStore::new();
        let metrics = names(&["temperature"]);

        let mut first = GraphConfig::with_defaults(&metrics);
        first.resolution = "5m".to_string();
        persist(&mut store, "sensor-1", &first, &metrics);

        let mut second = GraphConfig::with_defaults(&metrics);
        second.resolution = "1h".to_string();
        persist(&mut store, "sensor-2", &second, &metrics);

        assert_eq!(build_or_restore(&store, "sensor-1", &metrics).resolution, "5m");
        assert_eq!(build_or_restore(&store, "sensor-2", &metrics).resolution, "1h");
    }

    #[test]
    fn test_unparseable_stored_function_falls_back_to_average() {
        let mut store = MemoryStore::new();
        store.set("localhost:temperature.function", "P95");

        let metrics = names(&["temperature"]);
        let config = build_or_restore(&store, "localhost", &metrics);
        assert_eq!(config.metrics["temperature"].function, AggregationFunction::Average);
    }
}
