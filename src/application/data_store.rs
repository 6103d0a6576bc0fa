// Temperature data store - Hour-segmented read cache over the sample repository
use crate::application::clock::Clock;
use crate::application::error::{FetchError, ValidationError};
use crate::application::sample_repository::SampleRepository;
use crate::application::simplify::simplify_points;
use crate::domain::point::Point;
use crate::domain::sample::{Sample, TRACKED_FIELDS};
use crate::domain::segment::Segment;
use crate::domain::{POINTS_PER_HOUR, SIMPLIFY_THRESHOLD};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Samples are assumed to arrive at most once per second.
const MIN_SAMPLE_SPACING_MS: i64 = 1000;

/// Above this ratio of possible points to requested points, every hour is
/// reduced to `POINTS_PER_HOUR` before the final pass.
const SIMPLIFY_EACH_HOUR_RATIO: f64 = POINTS_PER_HOUR as f64 * 1.2;

type SegmentMap = HashMap<i64, Arc<Segment>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupStats {
    pub segments: usize,
    pub points: usize,
}

/// Serves downsampled time ranges, caching every hour that is old enough
/// to no longer receive writes.
///
/// Hours are keyed by the epoch milliseconds of their start. An hour is
/// cached only when it ended more than an hour before the fetch began, and
/// cached hours are dropped by [`cleanup_cache`](Self::cleanup_cache) once
/// they are older than the retention age.
pub struct TemperatureDataStore {
    repository: Arc<dyn SampleRepository>,
    clock: Arc<dyn Clock>,
    retention: TimeDelta,
    cache: RwLock<SegmentMap>,
}

impl TemperatureDataStore {
    pub fn new(
        repository: Arc<dyn SampleRepository>,
        clock: Arc<dyn Clock>,
        retention: TimeDelta,
    ) -> Self {
        Self {
            repository,
            clock,
            retention,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch at most `count` points between `min` and `max` (inclusive).
    ///
    /// May return fewer than `count` points when the range has gaps.
    pub async fn fetch(
        &self,
        min: DateTime<Utc>,
        max: DateTime<Utc>,
        count: i64,
    ) -> Result<Vec<Point>, FetchError> {
        if min > max {
            return Err(ValidationError::InvalidRange { min, max }.into());
        }
        if count <= 0 {
            return Err(ValidationError::NonPositiveCount(count).into());
        }

        let min_ms = min.timestamp_millis();
        let max_ms = max.timestamp_millis();
        let highest_possible_count = (max_ms - min_ms) / MIN_SAMPLE_SPACING_MS + 1;
        let count = count.min(highest_possible_count) as usize;

        let begin = hour_start(min_ms);
        let end = hour_start(max_ms) + HOUR_MS - 1;
        // Hours ending before this are assumed complete.
        let frozen = (self.clock.now() - TimeDelta::hours(1)).timestamp_millis();
        let simplify_each_hour =
            highest_possible_count as f64 / count as f64 > SIMPLIFY_EACH_HOUR_RATIO;

        let mut points: Vec<Sample> = Vec::new();
        let mut fetched: Vec<(i64, Segment)> = Vec::new();

        let mut hour = begin;
        while hour < end {
            let hour_end = hour + HOUR_MS - 1;
            let label = format_hour(hour);

            let cached = self.segments().get(&hour).cloned();
            if let Some(segment) = cached {
                tracing::debug!(hour = %label, points = segment.raw.len(), "got points from cache");
                points.extend_from_slice(segment.points(simplify_each_hour));
                hour += HOUR_MS;
                continue;
            }

            let (Some(start), Some(stop)) = (
                DateTime::from_timestamp_millis(hour),
                DateTime::from_timestamp_millis(hour_end),
            ) else {
                return Err(ValidationError::InvalidRange { min, max }.into());
            };

            tracing::debug!(hour = %label, "fetching data");
            let raw = self.repository.query_range(start, stop).await.map_err(|err| {
                tracing::warn!(hour = %label, error = %err, "storage query failed");
                FetchError::Storage(err)
            })?;
            tracing::debug!(hour = %label, points = raw.len(), "got points");

            let cacheable = hour_end < frozen;
            // Cached hours always carry their simplified form for later coarse requests.
            let simplified = if cacheable || (simplify_each_hour && raw.len() > SIMPLIFY_THRESHOLD) {
                simplify(raw.clone(), POINTS_PER_HOUR)
            } else {
                Vec::new()
            };
            let segment = Segment::new(raw, simplified);
            if simplify_each_hour && segment.raw.len() > SIMPLIFY_THRESHOLD {
                tracing::debug!(
                    hour = %label,
                    before = segment.raw.len(),
                    after = segment.simplified.len(),
                    "simplified hour"
                );
            }
            points.extend_from_slice(segment.points(simplify_each_hour));

            if cacheable {
                fetched.push((hour, segment));
            }
            hour += HOUR_MS;
        }

        if !fetched.is_empty() {
            let mut cache = self.segments_mut();
            for (hour, segment) in fetched {
                cache.insert(hour, Arc::new(segment));
            }
        }

        // Hour alignment pulls in samples outside the requested bounds.
        points.retain(|p| (min_ms..=max_ms).contains(&p.timestamp_ms()));

        if points.len() > count {
            tracing::info!(before = points.len(), after = count, "simplifying points");
            points = simplify(points, count);
        } else {
            tracing::debug!(points = points.len(), count, "not simplifying points");
        }

        Ok(points.iter().map(Point::from).collect())
    }

    /// Drop every segment whose hour started more than the retention age ago
    pub fn cleanup_cache(&self) -> CleanupStats {
        let cutoff = (self.clock.now() - self.retention).timestamp_millis();
        let mut stats = CleanupStats::default();

        self.segments_mut().retain(|hour, segment| {
            if *hour < cutoff {
                stats.segments += 1;
                stats.points += segment.raw.len();
                false
            } else {
                true
            }
        });

        tracing::info!(
            segments = stats.segments,
            points = stats.points,
            "cache cleanup deleted segments"
        );
        stats
    }

    /// Run [`cleanup_cache`](Self::cleanup_cache) every `period` until the
    /// store is dropped.
    pub fn spawn_cache_cleanup(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // consume the immediate first tick

            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.cleanup_cache();
            }
        })
    }

    /// Start instants of every cached hour, oldest first
    #[cfg(test)]
    pub fn cached_hours(&self) -> Vec<DateTime<Utc>> {
        let mut hours: Vec<i64> = self.segments().keys().copied().collect();
        hours.sort_unstable();
        hours
            .into_iter()
            .filter_map(DateTime::from_timestamp_millis)
            .collect()
    }

    fn segments(&self) -> RwLockReadGuard<'_, SegmentMap> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn segments_mut(&self) -> RwLockWriteGuard<'_, SegmentMap> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn simplify(points: Vec<Sample>, count: usize) -> Vec<Sample> {
    simplify_points(points, &TRACKED_FIELDS, count)
}

fn hour_start(ms: i64) -> i64 {
    ms.div_euclid(HOUR_MS) * HOUR_MS
}

fn format_hour(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|hour| hour.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
