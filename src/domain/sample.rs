// Temperature sample domain model
use chrono::{DateTime, Utc};

/// Field names tracked when simplifying a series of samples.
pub const TRACKED_FIELDS: [&str; 2] = ["temp_avg", "setpoint"];

/// One persisted reading. Temperatures are stored as hundredths of a degree.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub measured_at: DateTime<Utc>,
    pub temp_avg: i32,
    pub setpoint: Option<i32>,
    pub temp_1: Option<i32>,
    pub temp_2: Option<i32>,
    pub temp_3: Option<i32>,
}

impl Sample {
    pub fn new(measured_at: DateTime<Utc>, temp_avg: i32) -> Self {
        Self {
            measured_at,
            temp_avg,
            setpoint: None,
            temp_1: None,
            temp_2: None,
            temp_3: None,
        }
    }

    pub fn with_setpoint(mut self, setpoint: Option<i32>) -> Self {
        self.setpoint = setpoint;
        self
    }

    pub fn with_raw(mut self, temp_1: Option<i32>, temp_2: Option<i32>, temp_3: Option<i32>) -> Self {
        self.temp_1 = temp_1;
        self.temp_2 = temp_2;
        self.temp_3 = temp_3;
        self
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.measured_at.timestamp_millis()
    }
}

/// A timestamped record whose numeric fields can be looked up by name.
pub trait Timestamped {
    fn timestamp_ms(&self) -> i64;

    /// Returns `None` when the field is absent for this record.
    fn field(&self, name: &str) -> Option<f64>;
}

impl Timestamped for Sample {
    fn timestamp_ms(&self) -> i64 {
        Sample::timestamp_ms(self)
    }

    fn field(&self, name: &str) -> Option<f64> {
        let value = match name {
            "temp_avg" => Some(self.temp_avg),
            "setpoint" => self.setpoint,
            "temp_1" => self.temp_1,
            "temp_2" => self.temp_2,
            "temp_3" => self.temp_3,
            _ => None,
        };
        value.map(f64::from)
    }
}
