use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted telemetry sample. Immutable once stored; removed only by the
/// retention purge. `received_at` (server-assigned Unix seconds) is
/// authoritative for ordering and retention; `timestamp` is whatever the
/// device reported.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reading {
    pub id: i64,
    pub station_id: String,
    pub timestamp: Option<String>,
    pub received_at: i64,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub rain_daily_clicks: i64,
    pub battery_v: Option<f64>,
}

/// A validated reading that has not been persisted yet. The totalizer
/// snapshot (`rain_daily_clicks`) is filled in by the store during the
/// ingest transaction.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub station_id: String,
    pub timestamp: Option<String>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub battery_v: Option<f64>,
}

/// Per-station daily rain totalizer state. Exactly one row per station;
/// created lazily on first ingest, never deleted.
///
/// `last_esp_clicks` is the device's cumulative click counter as last
/// reported. It is advisory only (device counters reset on reboot) and is
/// never used for accumulation arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RainState {
    pub station_id: String,
    pub daily_clicks: i64,
    pub last_reset: i64,
    pub last_esp_clicks: Option<i64>,
}

/// Raw ingest payload as posted by the station. Everything except
/// `station_id` is optional; the validator decides what is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestRequest {
    pub station_id: Option<String>,
    pub timestamp: Option<String>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub battery_v: Option<f64>,
    /// Clicks since the device's previous report, already debounced on-device.
    pub rain_delta_clicks: Option<i64>,
    /// Device cumulative click counter, advisory only.
    pub rain_clicks: Option<i64>,
}
