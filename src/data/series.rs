//! Reshaping query results into chartable series.
//!
//! The measurements endpoint returns data row-major: one inner sequence
//! per timestamp window, each holding the values computed for that
//! window under their exported names. Charting sinks want the
//! transpose: one named series per export, each an ordered list of
//! `[timestamp, value]` pairs. [`to_series`] performs that reshape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::measurement::Measurement;

/// One named series of `(timestamp, value)` pairs, ready for a
/// point-and-line plot.
///
/// Serialises as `{"label": ..., "data": [[ts, value], ...]}` with
/// gaps rendered as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub data: Vec<(i64, Option<f64>)>,
}

/// Flatten a result set into one series per distinct measurement name.
///
/// Rows are scanned in order, points within each row in order. A series
/// is created lazily on the first occurrence of its name, so the output
/// preserves first-seen order across the whole scan; within a series,
/// pairs appear in scan order and are never re-sorted by timestamp.
///
/// When `filter` is given, only measurements whose name appears in it
/// contribute; everything else is skipped without creating a series.
///
/// Input is not validated: a point with no value yields a `(ts, None)`
/// gap pair rather than an error.
pub fn to_series(results: &[Vec<Measurement>], filter: Option<&[String]>) -> Vec<Series> {
    let mut series: Vec<Series> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in results {
        for point in row {
            if let Some(names) = filter {
                if !names.iter().any(|n| n == &point.name) {
                    continue;
                }
            }

            let at = match index.get(&point.name) {
                Some(at) => *at,
                None => {
                    series.push(Series {
                        label: point.name.clone(),
                        data: Vec::new(),
                    });
                    let at = series.len() - 1;
                    index.insert(point.name.clone(), at);
                    at
                }
            };

            series[at].data.push((point.timestamp, point.value));
        }
    }

    series
}
