//! Test-data generation.
//!
//! Builds a synthetic resource with a jittered gauge and uploads it in
//! fixed-size batches, one batch at a time: each upload is awaited
//! before the next is sent, so a slow service naturally throttles the
//! generator instead of being buried under concurrent writes.

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::data::{ResourceRef, Sample};
use crate::service::{MetricsService, ServiceError};

/// Baseline for the generated gauge; values jitter ±5 around it.
const BASELINE: f64 = 50.0;

/// Shape of a seeding run.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    /// Total samples to generate.
    pub samples: usize,
    /// Spacing between consecutive samples, in milliseconds.
    pub interval_ms: i64,
    /// Samples per upload batch.
    pub batch_size: usize,
}

impl Default for SeedPlan {
    /// 30 days of one-minute samples, uploaded 100 at a time.
    fn default() -> Self {
        Self {
            samples: 43_200,
            interval_ms: 60_000,
            batch_size: 100,
        }
    }
}

/// What a seeding run produced.
#[derive(Debug)]
pub struct SeedReport {
    /// The generated resource id, e.g. `TestData_(1a2b3c4d)`.
    pub resource: String,
    pub samples: usize,
    pub batches: usize,
    /// First generated timestamp (epoch milliseconds).
    pub start_ms: i64,
    /// One interval past the last generated timestamp.
    pub end_ms: i64,
}

/// Generate the samples for a plan, ending at `end_ms`.
///
/// Returns the generated resource id alongside the samples; timestamps
/// ascend strictly by `interval_ms` and end one interval before
/// `end_ms`. Each resource is tagged `type: generated` so seeded data
/// is findable by search.
pub fn generate(plan: &SeedPlan, end_ms: i64) -> (String, Vec<Sample>) {
    let mut rng = rand::thread_rng();
    let resource_id = format!("TestData_({:08x})", rng.gen::<u32>());
    let resource = ResourceRef::new(&resource_id).with_attribute("type", "generated");

    let start_ms = end_ms - plan.samples as i64 * plan.interval_ms;
    let mut samples = Vec::with_capacity(plan.samples);

    let mut timestamp = start_ms;
    for _ in 0..plan.samples {
        samples.push(Sample {
            resource: resource.clone(),
            timestamp,
            name: "data".to_string(),
            metric_type: "GAUGE".to_string(),
            value: BASELINE + rng.gen_range(-5.0..5.0),
        });
        timestamp += plan.interval_ms;
    }

    (resource_id, samples)
}

/// Generate and upload a full seeding run.
pub async fn run(service: &dyn MetricsService, plan: &SeedPlan) -> Result<SeedReport, ServiceError> {
    let end_ms = Utc::now().timestamp_millis();
    let (resource, samples) = generate(plan, end_ms);

    let batch_size = plan.batch_size.max(1);
    let mut batches = 0;
    for chunk in samples.chunks(batch_size) {
        service.insert_samples(chunk).await?;
        batches += 1;
        debug!(resource = %resource, batch = batches, "uploaded sample batch");
    }

    Ok(SeedReport {
        resource,
        samples: samples.len(),
        batches,
        start_ms: end_ms - plan.samples as i64 * plan.interval_ms,
        end_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ResultSet, SearchResult};
    use crate::service::{QueryBounds, ResultDescriptor};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn test_generate_shape() {
        let plan = SeedPlan {
            samples: 10,
            interval_ms: 60_000,
            batch_size: 3,
        };
        let (resource, samples) = generate(&plan, 1_000_000_000);

        assert!(resource.starts_with("TestData_("));
        assert_eq!(samples.len(), 10);
        assert_eq!(samples[0].timestamp, 1_000_000_000 - 10 * 60_000);

        for pair in samples.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, 60_000);
        }
        for sample in &samples {
            assert_eq!(sample.name, "data");
            assert_eq!(sample.metric_type, "GAUGE");
            assert_eq!(sample.resource.id, resource);
            assert!((sample.value - BASELINE).abs() <= 5.0);
            assert_eq!(
                sample.resource.attributes.as_ref().unwrap()["type"],
                "generated"
            );
        }
    }

    /// Records the size of every uploaded batch.
    #[derive(Debug, Default)]
    struct RecordingService {
        batch_sizes: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl MetricsService for RecordingService {
        async fn measurements(
            &self,
            _resource: &str,
            _descriptor: &ResultDescriptor,
            _resolution: Option<&str>,
            _bounds: &QueryBounds,
        ) -> Result<ResultSet, ServiceError> {
            Ok(Vec::new())
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, ServiceError> {
            Ok(Vec::new())
        }

        async fn insert_samples(&self, samples: &[Sample]) -> Result<(), ServiceError> {
            self.batch_sizes.lock().unwrap().push(samples.len());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_uploads_sequential_batches() {
        let service = RecordingService::default();
        let plan = SeedPlan {
            samples: 250,
            interval_ms: 1_000,
            batch_size: 100,
        };

        let report = run(&service, &plan).await.unwrap();

        assert_eq!(report.samples, 250);
        assert_eq!(report.batches, 3);
        assert_eq!(*service.batch_sizes.lock().unwrap(), vec![100, 100, 50]);
        assert_eq!(report.end_ms - report.start_ms, 250 * 1_000);
    }
}
