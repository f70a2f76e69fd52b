//! Physical sanity checks for submitted readings.
//!
//! A missing `station_id` short-circuits everything else; range checks apply
//! only to fields that are present, and every violation is collected so the
//! device operator sees the full list in one round trip.

use crate::models::{IngestRequest, NewReading};

const TEMPERATURE_RANGE: (f64, f64) = (-40.0, 60.0);
const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);
const PRESSURE_RANGE: (f64, f64) = (300.0, 1100.0);

#[derive(Debug)]
pub enum ValidationOutcome {
    Accepted(NewReading),
    Rejected(Vec<String>),
}

/// Check a raw payload against the required-field and range rules, producing
/// either a normalized reading-in-progress or the full list of failures.
pub fn validate(payload: &IngestRequest) -> ValidationOutcome {
    let station_id = match payload.station_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return ValidationOutcome::Rejected(vec!["station_id is required".to_string()]),
    };

    let mut errors = Vec::new();
    check_range(payload.temperature_c, "temperature_c", TEMPERATURE_RANGE, &mut errors);
    check_range(payload.humidity_pct, "humidity_pct", HUMIDITY_RANGE, &mut errors);
    check_range(payload.pressure_hpa, "pressure_hpa", PRESSURE_RANGE, &mut errors);

    if !errors.is_empty() {
        return ValidationOutcome::Rejected(errors);
    }

    ValidationOutcome::Accepted(NewReading {
        station_id,
        timestamp: payload.timestamp.clone(),
        temperature_c: payload.temperature_c,
        humidity_pct: payload.humidity_pct,
        pressure_hpa: payload.pressure_hpa,
        wind_speed_kmh: payload.wind_speed_kmh,
        wind_direction_deg: payload.wind_direction_deg,
        battery_v: payload.battery_v,
    })
}

fn check_range(value: Option<f64>, field: &str, (lo, hi): (f64, f64), errors: &mut Vec<String>) {
    if let Some(v) = value {
        if v < lo || v > hi {
            errors.push(format!("{field} out of range ({lo} to {hi})"));
        }
    }
}
