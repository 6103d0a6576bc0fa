use chrono::TimeDelta;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http: HttpSettings,
    pub influx: InfluxSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    pub bind: String,
    pub base_path: String,
    pub max_range_days: i64,
    pub max_count: i64,
    pub default_count: i64,
    pub default_range_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    pub measurement: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    pub sweep_interval_secs: u64,
    pub retention_days: i64,
}

impl CacheSettings {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn retention(&self) -> TimeDelta {
        TimeDelta::days(self.retention_days)
    }
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("http.bind", "0.0.0.0:8080")?
        .set_default("http.base_path", "")?
        .set_default("http.max_range_days", 10)?
        .set_default("http.max_count", 5000)?
        .set_default("http.default_count", 500)?
        .set_default("http.default_range_hours", 48)?
        .set_default("influx.host", "http://localhost:8086")?
        .set_default("influx.token", "")?
        .set_default("influx.database", "temperature")?
        .set_default("influx.retention_policy", "autogen")?
        .set_default("influx.measurement", "temperature_data")?
        .set_default("cache.sweep_interval_secs", 60 * 60)?
        .set_default("cache.retention_days", 10)?)
}

/// Defaults, overridden by `config/app.*`, overridden by `TEMPERATURE__*`
/// environment variables (e.g. `TEMPERATURE__INFLUX__TOKEN`).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("TEMPERATURE").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
