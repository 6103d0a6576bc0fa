// Shared fixtures for unit tests
use crate::application::clock::Clock;
use crate::application::sample_repository::SampleRepository;
use crate::domain::sample::Sample;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::io;
use std::sync::{Arc, Mutex};

/// Synthetic reading for second `t`: a slow sine wave around zero.
pub fn generate_sample(t: i64) -> Sample {
    let ms = t * 1000;
    let temp = (1000.0 * (ms as f64 / 10_000.0).sin()).round() as i32;
    Sample::new(DateTime::from_timestamp_millis(ms).unwrap(), temp)
        .with_setpoint(Some(1))
        .with_raw(Some(temp - 10), Some(temp), Some(temp + 10))
}

/// One sample per second in `min..=max` seconds, with gaps at
/// 100..=200 and 8000..=12000.
pub fn generate_samples(min: i64, max: i64) -> Vec<Sample> {
    (min..=max)
        .filter(|t| !(100..=200).contains(t) && !(8000..=12_000).contains(t))
        .map(generate_sample)
        .collect()
}

/// Repository backed by `generate_samples` that records every query.
#[derive(Default)]
pub struct MockRepository {
    queries: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    fail_at: Mutex<Option<DateTime<Utc>>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.queries.lock().unwrap().clone()
    }

    /// Fail any query starting at `start`.
    pub fn fail_at(&self, start: DateTime<Utc>) {
        *self.fail_at.lock().unwrap() = Some(start);
    }
}

#[async_trait]
impl SampleRepository for MockRepository {
    async fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Sample>> {
        self.queries.lock().unwrap().push((start, end));
        if *self.fail_at.lock().unwrap() == Some(start) {
            anyhow::bail!("connection reset while querying {start}");
        }

        let first = (start.timestamp_millis() + 999).div_euclid(1000);
        let last = end.timestamp_millis().div_euclid(1000);
        Ok(generate_samples(first, last))
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Collects formatted tracing output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
