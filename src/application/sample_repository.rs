// Repository trait for raw sample access
use crate::domain::sample::Sample;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// All samples with `start <= measured_at <= end`, oldest first
    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Sample>>;
}
