//! # metricwatch
//!
//! A CLI and library for exploring and graphing time-series
//! measurements held by a remote Newts-style metrics service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌──────────────────────────┐ │
//! │  │  app    │───▶│   data   │───▶│ Series JSON (chart sink) │ │
//! │  │(session)│    │(reshaping)    └──────────────────────────┘ │
//! │  └──┬───┬──┘    └──────────┘                                 │
//! │     │   │                                                    │
//! │     ▼   ▼                                                    │
//! │  ┌─────────┐  ┌─────────┐                                    │
//! │  │ service │  │  store  │◀── FileStore | MemoryStore         │
//! │  │ (query) │  │ (state) │                                    │
//! │  └─────────┘  └─────────┘                                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: graph session orchestration - select a resource,
//!   restore its configuration, draw
//! - **[`data`]**: wire types, the result-set → series transform, and
//!   graph configuration persistence
//! - **[`service`]**: the metrics-service seam ([`MetricsService`])
//!   with its HTTP implementation
//! - **[`store`]**: durable key/value storage ([`KeyValueStore`]) for
//!   graph configurations
//! - **[`seed`]**: synthetic sample generation for populating a test
//!   service
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Find graphable resources
//! metricwatch search "type:generated"
//!
//! # Query and emit chartable series
//! metricwatch graph localhost -m ifInOctets,ifOutOctets --resolution 15m
//! ```
//!
//! ### As a library
//!
//! ```
//! use metricwatch::{build_or_restore, to_series, AggregationFunction, MemoryStore};
//!
//! // Configurations restore from whatever store the caller injects
//! let store = MemoryStore::new();
//! let metrics = vec!["temperature".to_string()];
//! let config = build_or_restore(&store, "sensor-1", &metrics);
//! assert_eq!(config.metrics["temperature"].function, AggregationFunction::Average);
//!
//! // Query responses reshape into one series per exported name
//! let series = to_series(&[], None);
//! assert!(series.is_empty());
//! ```

pub mod app;
pub mod data;
pub mod seed;
pub mod service;
pub mod settings;
pub mod store;

// Re-export main types for convenience
pub use app::{App, DrawOutcome};
pub use data::{
    build_or_restore, persist, to_series, AggregationFunction, GraphConfig, Measurement,
    MetricConfig, ResourceRef, ResultSet, Sample, SearchResult, Series, TimeRange,
};
pub use seed::{SeedPlan, SeedReport};
pub use service::{
    Datasource, MetricsClient, MetricsService, QueryBounds, ResultDescriptor, ServiceError,
};
pub use settings::Settings;
pub use store::{FileStore, KeyValueStore, MemoryStore};
