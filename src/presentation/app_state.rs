// Application state for HTTP handlers
use crate::application::data_store::TemperatureDataStore;
use crate::infrastructure::config::HttpSettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub data_store: Arc<TemperatureDataStore>,
    pub limits: RequestLimits,
}

/// Bounds and defaults applied to `/data` requests
#[derive(Debug, Clone)]
pub struct RequestLimits {
    pub max_range_days: i64,
    pub max_count: i64,
    pub default_count: i64,
    pub default_range_hours: i64,
}

impl From<&HttpSettings> for RequestLimits {
    fn from(http: &HttpSettings) -> Self {
        Self {
            max_range_days: http.max_range_days,
            max_count: http.max_count,
            default_count: http.default_count,
            default_range_hours: http.default_range_hours,
        }
    }
}
