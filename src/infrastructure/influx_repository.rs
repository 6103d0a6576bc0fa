// InfluxDB repository implementation
use crate::application::sample_repository::SampleRepository;
use crate::domain::sample::Sample;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(
        host: String,
        token: String,
        database: String,
        retention_policy: String,
        measurement: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
            measurement,
        }
    }

    fn range_query(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "SELECT temp_1, temp_2, temp_3, temp_avg, setpoint FROM \"{}\" WHERE time >= '{}' AND time <= '{}'",
            self.measurement,
            start.to_rfc3339_opts(SecondsFormat::Millis, true),
            end.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&epoch=ms&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        // Check for errors in the response
        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl SampleRepository for InfluxRepository {
    async fn query_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Sample>> {
        let query = self.range_query(start, end);
        tracing::debug!("Executing range query: {}", query);
        let response = self.execute_query(&query).await?;
        Ok(samples_from_response(response))
    }
}

/// Map every row with a timestamp and an average temperature to a sample
fn samples_from_response(response: InfluxQLResponse) -> Vec<Sample> {
    let mut samples = Vec::new();

    for result in response.results {
        for series in result.series.unwrap_or_default() {
            let column = |name: &str| series.columns.iter().position(|c| c == name);
            let time_idx = column("time").unwrap_or(0);
            let avg_idx = column("temp_avg");
            let setpoint_idx = column("setpoint");
            let raw_idx = [column("temp_1"), column("temp_2"), column("temp_3")];

            for row in &series.values {
                let measured_at = row
                    .get(time_idx)
                    .and_then(|v| v.as_i64())
                    .and_then(DateTime::from_timestamp_millis);
                let temp_avg = avg_idx.and_then(|i| scaled(row.get(i)));

                let (Some(measured_at), Some(temp_avg)) = (measured_at, temp_avg) else {
                    tracing::debug!("Skipping row without time or temp_avg: {:?}", row);
                    continue;
                };

                let field = |idx: Option<usize>| idx.and_then(|i| scaled(row.get(i)));
                samples.push(
                    Sample::new(measured_at, temp_avg)
                        .with_setpoint(field(setpoint_idx))
                        .with_raw(field(raw_idx[0]), field(raw_idx[1]), field(raw_idx[2])),
                );
            }
        }
    }

    samples.sort_by_key(|s| s.measured_at);
    samples
}

/// Stored values are integers; anything else is rounded.
fn scaled(value: Option<&serde_json::Value>) -> Option<i32> {
    let value = value?;
    match value.as_i64() {
        Some(n) => i32::try_from(n).ok(),
        None => value.as_f64().map(|f| f.round() as i32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn repository() -> InfluxRepository {
        InfluxRepository::new(
            "http://localhost:8086/".to_string(),
            "secret".to_string(),
            "temperature".to_string(),
            "autogen".to_string(),
            "temperature_data".to_string(),
        )
    }

    #[test]
    fn test_range_query() {
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 3, 0, 0).unwrap();
        let end = start + chrono::TimeDelta::milliseconds(3_599_999);

        assert_eq!(
            repository().range_query(start, end),
            "SELECT temp_1, temp_2, temp_3, temp_avg, setpoint FROM \"temperature_data\" \
             WHERE time >= '2026-10-19T03:00:00.000Z' AND time <= '2026-10-19T03:59:59.999Z'"
        );
    }

    #[test]
    fn test_build_query_url() {
        let url = repository().build_query_url("SELECT 1");
        assert_eq!(
            url,
            "http://localhost:8086/query?db=temperature&rp=autogen&epoch=ms&q=SELECT%201"
        );
    }

    #[test]
    fn test_samples_from_response() {
        let response: InfluxQLResponse = serde_json::from_value(serde_json::json!({
            "results": [{
                "series": [{
                    "name": "temperature_data",
                    "columns": ["time", "temp_1", "temp_2", "temp_3", "temp_avg", "setpoint"],
                    "values": [
                        [2000, 2100, 2110, null, 2105.4, null],
                        [1000, 2090, 2100, 2110, 2100, 2200],
                        [3000, 2100, 2100, 2100, null, 2200]
                    ]
                }]
            }]
        }))
        .unwrap();

        let samples = samples_from_response(response);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp_ms(), 1000);
        assert_eq!(samples[0].setpoint, Some(2200));
        assert_eq!(samples[0].temp_3, Some(2110));
        assert_eq!(samples[1].timestamp_ms(), 2000);
        assert_eq!(samples[1].temp_avg, 2105);
        assert_eq!(samples[1].setpoint, None);
        assert_eq!(samples[1].temp_3, None);
    }

    #[test]
    fn test_empty_result_has_no_samples() {
        let response: InfluxQLResponse =
            serde_json::from_value(serde_json::json!({ "results": [{}] })).unwrap();
        assert!(samples_from_response(response).is_empty());
    }
}
