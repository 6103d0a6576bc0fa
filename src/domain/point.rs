// Normalized output point returned to callers
use super::sample::Sample;
use serde::Serialize;

const SCALE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub timestamp: i64,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setpoint: Option<f64>,
    pub raw: RawTemperatures,
}

/// Individual probe readings that make up the averaged temperature
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawTemperatures {
    #[serde(rename = "temp1", skip_serializing_if = "Option::is_none")]
    pub temp_1: Option<f64>,
    #[serde(rename = "temp2", skip_serializing_if = "Option::is_none")]
    pub temp_2: Option<f64>,
    #[serde(rename = "temp3", skip_serializing_if = "Option::is_none")]
    pub temp_3: Option<f64>,
}

fn unscale(value: i32) -> f64 {
    f64::from(value) / SCALE
}

impl From<&Sample> for Point {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp_ms(),
            temperature: unscale(sample.temp_avg),
            setpoint: sample.setpoint.map(unscale),
            raw: RawTemperatures {
                temp_1: sample.temp_1.map(unscale),
                temp_2: sample.temp_2.map(unscale),
                temp_3: sample.temp_3.map(unscale),
            },
        }
    }
}
