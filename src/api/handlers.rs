use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::auth::verify_ingest_key;
use crate::config::Config;
use crate::models::{IngestRequest, Reading};
use crate::storage::{RainInput, Storage};
use crate::weather::export::{self, ExportFormat};
use crate::weather::{aggregate, downsample, validate, Range, ValidationOutcome, WeatherStats};

/// Hard cap on points returned by the history endpoint.
const MAX_HISTORY_POINTS: usize = 500;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Arc<Config>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn storage_error(context: &str, err: impl std::fmt::Display) -> ApiError {
    tracing::error!("{context}: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::message(context.to_string())),
    )
}

fn rfc3339(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

#[derive(Serialize)]
pub struct IngestAck {
    pub message: String,
    pub success: bool,
}

/// Ingest one reading from a station.
pub async fn ingest_reading(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestAck>, ApiError> {
    if let Err(message) = verify_ingest_key(&headers, state.config.weather.api_key.as_deref()) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::message(message)),
        ));
    }

    let reading = match validate(&payload) {
        ValidationOutcome::Accepted(reading) => reading,
        ValidationOutcome::Rejected(errors) => {
            let message = if errors.iter().any(|e| e == "station_id is required") {
                "station_id is required"
            } else {
                "Validation failed"
            };
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    message: message.to_string(),
                    errors: Some(errors),
                }),
            ));
        }
    };

    let rain = RainInput {
        delta_clicks: payload.rain_delta_clicks.unwrap_or(0),
        device_clicks: payload.rain_clicks,
    };

    let outcome = state
        .storage
        .ingest(&reading, rain, Utc::now())
        .await
        .map_err(|e| storage_error("Failed to ingest reading", e))?;

    tracing::info!(
        "{}: {:?} C, {:?} %RH, {:?} hPa, rain {} clicks, bat {:?} V",
        outcome.reading.station_id,
        outcome.reading.temperature_c,
        outcome.reading.humidity_pct,
        outcome.reading.pressure_hpa,
        outcome.rain.daily_clicks,
        outcome.reading.battery_v,
    );

    Ok(Json(IngestAck {
        message: "Data ingested".to_string(),
        success: true,
    }))
}

/// Latest reading for the default station, merged with live rain-state
/// fields. The rain fields come from the store, not from the stored reading,
/// so a reset or rollover since the last ingest is reflected immediately.
pub async fn current_reading(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let station = &state.config.weather.default_station_id;

    let latest = state
        .storage
        .latest(station)
        .await
        .map_err(|e| storage_error("Failed to read latest reading", e))?;

    let Some(reading) = latest else {
        return Ok(Json(json!({
            "station_id": null,
            "message": "No data received yet. Waiting for station...",
        })));
    };

    let rain = state
        .storage
        .rain_state(station)
        .await
        .map_err(|e| storage_error("Failed to read rain state", e))?;

    let mut body = serde_json::to_value(&reading)
        .map_err(|e| storage_error("Failed to serialize reading", e))?;
    body["time"] = json!(rfc3339(reading.received_at));
    if let Some(rain) = rain {
        body["rain_daily_clicks"] = json!(rain.daily_clicks);
        body["rain_last_reset"] = json!(rfc3339(rain.last_reset));
    }

    Ok(Json(body))
}

#[derive(Debug, Default, Deserialize)]
pub struct RainResetRequest {
    pub station_id: Option<String>,
}

/// Manually zero the rain totalizer (testing/calibration).
pub async fn rain_reset(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<RainResetRequest>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let station = request
        .station_id
        .unwrap_or_else(|| state.config.weather.default_station_id.clone());

    let reset = state
        .storage
        .reset_rain(&station, Utc::now())
        .await
        .map_err(|e| storage_error("Failed to reset rain totalizer", e))?;

    tracing::info!(
        "{station}: manual rain reset, {} clicks -> 0",
        reset.previous_clicks
    );

    Ok(Json(json!({
        "message": "Rain totalizer zeroed",
        "previous": { "daily_clicks": reset.previous_clicks },
        "reset_at": rfc3339(reset.state.last_reset),
    })))
}

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub station: Option<String>,
    pub range: Option<String>,
    pub limit: Option<usize>,
    pub format: Option<String>,
}

/// One chart-ready history point.
#[derive(Serialize)]
pub struct HistoryPoint {
    pub time: String,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub rain_daily_clicks: i64,
    pub battery_v: Option<f64>,
}

impl From<Reading> for HistoryPoint {
    fn from(r: Reading) -> Self {
        HistoryPoint {
            time: rfc3339(r.received_at),
            temperature_c: r.temperature_c,
            humidity_pct: r.humidity_pct,
            pressure_hpa: r.pressure_hpa,
            wind_speed_kmh: r.wind_speed_kmh,
            wind_direction_deg: r.wind_direction_deg,
            rain_daily_clicks: r.rain_daily_clicks,
            battery_v: r.battery_v,
        }
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub station: String,
    pub range: String,
    pub count: usize,
    pub data: Vec<HistoryPoint>,
}

/// Downsampled window of readings for chart rendering.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let station = query
        .station
        .unwrap_or_else(|| state.config.weather.default_station_id.clone());
    let range = Range::parse(query.range.as_deref());
    let limit = query
        .limit
        .unwrap_or(MAX_HISTORY_POINTS)
        .clamp(1, MAX_HISTORY_POINTS);

    let rows = state
        .storage
        .query_since(&station, range.start(Utc::now()))
        .await
        .map_err(|e| storage_error("Failed to query history", e))?;

    let data: Vec<HistoryPoint> = downsample(rows, limit)
        .into_iter()
        .map(HistoryPoint::from)
        .collect();

    Ok(Json(HistoryResponse {
        station,
        range: range.as_str().to_string(),
        count: data.len(),
        data,
    }))
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub station: String,
    pub range: String,
    #[serde(flatten)]
    pub stats: WeatherStats,
}

/// Min/max/average per metric over the window.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<StatsResponse>, ApiError> {
    let station = query
        .station
        .unwrap_or_else(|| state.config.weather.default_station_id.clone());
    let range = Range::parse(query.range.as_deref());

    let rows = state
        .storage
        .query_since(&station, range.start(Utc::now()))
        .await
        .map_err(|e| storage_error("Failed to query stats window", e))?;

    Ok(Json(StatsResponse {
        station,
        range: range.as_str().to_string(),
        stats: aggregate(&rows),
    }))
}

/// Exact (never downsampled) window export as a downloadable file.
pub async fn export_window(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiError> {
    let station = query
        .station
        .unwrap_or_else(|| state.config.weather.default_station_id.clone());
    let range = Range::parse(query.range.as_deref());
    let format = ExportFormat::parse(query.format.as_deref()).map_err(|message| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: "Invalid export format".to_string(),
                errors: Some(vec![message]),
            }),
        )
    })?;

    let now = Utc::now();
    let rows = state
        .storage
        .query_since(&station, range.start(now))
        .await
        .map_err(|e| storage_error("Failed to query export window", e))?;

    let body = export::render(&rows, format)
        .map_err(|e| storage_error("Failed to render export", e))?;
    let filename = export::filename(&station, range, format, now);

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

/// Liveness probe.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
