//! Window export as downloadable CSV or JSON.
//!
//! Export is exact: it materializes the same row set as the store query,
//! never the downsampled one.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Reading;
use crate::weather::range::Range;

pub const CSV_HEADER: &str =
    "time,station_id,temperature_c,humidity_pct,pressure_hpa,wind_speed_kmh,wind_direction_deg,rain_daily_clicks,battery_v";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Parse a format token. Missing defaults to CSV; an unknown token is a
    /// client error (unlike the range token, there is no safe default for a
    /// file the caller will feed into other tooling).
    pub fn parse(token: Option<&str>) -> Result<Self, String> {
        match token {
            None | Some("csv") => Ok(ExportFormat::Csv),
            Some("json") => Ok(ExportFormat::Json),
            Some(other) => Err(format!("unknown export format '{other}' (csv or json)")),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

/// Deterministic download filename: `weather-<station>-<range>-<date>.<ext>`.
pub fn filename(station: &str, range: Range, format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "weather-{station}-{}-{}.{}",
        range.as_str(),
        now.format("%Y-%m-%d"),
        format.extension()
    )
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    time: String,
    station_id: &'a str,
    temperature_c: Option<f64>,
    humidity_pct: Option<f64>,
    pressure_hpa: Option<f64>,
    wind_speed_kmh: Option<f64>,
    wind_direction_deg: Option<f64>,
    rain_daily_clicks: i64,
    battery_v: Option<f64>,
}

fn row_time(reading: &Reading) -> String {
    DateTime::<Utc>::from_timestamp(reading.received_at, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// Render rows in the requested representation.
pub fn render(rows: &[Reading], format: ExportFormat) -> anyhow::Result<String> {
    match format {
        ExportFormat::Csv => Ok(render_csv(rows)),
        ExportFormat::Json => {
            let out: Vec<ExportRow> = rows.iter().map(export_row).collect();
            Ok(serde_json::to_string(&out)?)
        }
    }
}

fn export_row(reading: &Reading) -> ExportRow<'_> {
    ExportRow {
        time: row_time(reading),
        station_id: &reading.station_id,
        temperature_c: reading.temperature_c,
        humidity_pct: reading.humidity_pct,
        pressure_hpa: reading.pressure_hpa,
        wind_speed_kmh: reading.wind_speed_kmh,
        wind_direction_deg: reading.wind_direction_deg,
        rain_daily_clicks: reading.rain_daily_clicks,
        battery_v: reading.battery_v,
    }
}

fn csv_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn render_csv(rows: &[Reading]) -> String {
    let mut out = String::with_capacity(64 + rows.len() * 64);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for r in rows {
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            row_time(r),
            r.station_id,
            csv_opt(r.temperature_c),
            csv_opt(r.humidity_pct),
            csv_opt(r.pressure_hpa),
            csv_opt(r.wind_speed_kmh),
            csv_opt(r.wind_direction_deg),
            r.rain_daily_clicks,
            csv_opt(r.battery_v),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(received_at: i64, temp: Option<f64>) -> Reading {
        Reading {
            id: 0,
            station_id: "wx-station-01".to_string(),
            timestamp: None,
            received_at,
            temperature_c: temp,
            humidity_pct: Some(65.2),
            pressure_hpa: None,
            wind_speed_kmh: Some(12.3),
            wind_direction_deg: None,
            rain_daily_clicks: 3,
            battery_v: None,
        }
    }

    #[test]
    fn format_parse_defaults_to_csv_and_rejects_unknown() {
        assert_eq!(ExportFormat::parse(None), Ok(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse(Some("csv")), Ok(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse(Some("json")), Ok(ExportFormat::Json));
        assert!(ExportFormat::parse(Some("xlsx")).is_err());
    }

    #[test]
    fn filename_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap();
        assert_eq!(
            filename("wx-station-01", Range::Hours24, ExportFormat::Csv, now),
            "weather-wx-station-01-24h-2026-03-10.csv"
        );
        assert_eq!(
            filename("wx-station-01", Range::Days7, ExportFormat::Json, now),
            "weather-wx-station-01-7d-2026-03-10.json"
        );
    }

    #[test]
    fn csv_renders_missing_values_as_empty_fields() {
        let rows = vec![reading(1_750_000_000, None)];
        let csv = render(&rows, ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap();
        assert!(!row.contains("null"));
        // temperature_c, pressure_hpa, wind_direction_deg, battery_v empty
        assert!(row.ends_with(",12.3,,3,"));
    }

    #[test]
    fn both_formats_carry_every_row() {
        let rows: Vec<Reading> = (0..17i64)
            .map(|i| reading(1_750_000_000 + i * 60, Some(20.0)))
            .collect();

        let csv = render(&rows, ExportFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), rows.len() + 1);

        let json = render(&rows, ExportFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), rows.len());
    }
}
