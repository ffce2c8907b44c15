//! Data models and the two reshaping cores.
//!
//! ## Submodules
//!
//! - [`measurement`]: wire types for the metrics service (results,
//!   samples, search hits)
//! - [`series`]: result-set → chartable series transform
//! - [`graph`]: per-resource graph configuration and its persistence
//!
//! ## Data flow
//!
//! ```text
//! SearchResult (resource + metric names)
//!        │
//!        ▼
//! graph::build_or_restore()        ──▶ GraphConfig
//!        │                              │ persisted per draw
//!        ▼                              ▼
//! measurements query            KeyValueStore
//!        │
//!        ▼
//! series::to_series()           ──▶ Vec<Series> (charting sink)
//! ```

pub mod graph;
pub mod measurement;
pub mod series;

pub use graph::{
    build_or_restore, persist, AggregationFunction, GraphConfig, MetricConfig, TimeRange,
};
pub use measurement::{Measurement, ResourceRef, ResultSet, Sample, SearchResult};
pub use series::{to_series, Series};
