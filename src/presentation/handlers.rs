// HTTP request handlers
use crate::application::error::FetchError;
use crate::domain::point::Point;
use crate::presentation::app_state::{AppState, RequestLimits};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    pub min: Option<String>,
    pub max: Option<String>,
    pub count: Option<String>,
}

#[derive(Debug, Serialize)]
struct DataResponse {
    ok: bool,
    data: Vec<Point>,
    requested: RangeSummary,
    actual: RangeSummary,
}

#[derive(Debug, Serialize)]
struct RangeSummary {
    min: i64,
    max: i64,
    count: i64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    let body = ErrorResponse {
        ok: false,
        error: error.into(),
    };
    (status, Json(body)).into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Downsampled temperature data for a time range
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DataQuery>,
) -> Response {
    let limits = &state.limits;
    let now = Utc::now();
    let min = query
        .min
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or_else(|| now - TimeDelta::hours(limits.default_range_hours));
    let max = query.max.as_deref().and_then(parse_timestamp).unwrap_or(now);
    let count = parse_count(query.count.as_deref(), limits.default_count);

    if exceeds_limits(limits, min, max, count) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "Too much data requested (>{} days / >{} points)",
                limits.max_range_days, limits.max_count
            ),
        );
    }

    match state.data_store.fetch(min, max, count).await {
        Ok(points) => {
            let actual = match (points.first(), points.last()) {
                (Some(first), Some(last)) => RangeSummary {
                    min: first.timestamp,
                    max: last.timestamp,
                    count: points.len() as i64,
                },
                _ => RangeSummary {
                    min: 0,
                    max: 0,
                    count: 0,
                },
            };

            Json(DataResponse {
                ok: true,
                data: points,
                requested: RangeSummary {
                    min: min.timestamp_millis(),
                    max: max.timestamp_millis(),
                    count,
                },
                actual,
            })
            .into_response()
        }
        Err(e @ FetchError::Validation(_)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e @ FetchError::Storage(_)) => {
            tracing::error!("Error fetching data: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

fn exceeds_limits(limits: &RequestLimits, min: DateTime<Utc>, max: DateTime<Utc>, count: i64) -> bool {
    max - min > TimeDelta::days(limits.max_range_days) || count > limits.max_count
}

/// Accepts epoch milliseconds or an RFC 3339 instant
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(ms) = value.parse::<i64>() {
        return ms.checked_abs().and_then(DateTime::from_timestamp_millis);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Missing, zero or non-numeric counts fall back to the default
fn parse_count(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|c| c.trim().parse::<i64>().ok())
        .filter(|c| *c != 0)
        .unwrap_or(default)
}
