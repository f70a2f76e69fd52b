//! Per-window min/max/average summaries.

use serde::Serialize;

use crate::models::Reading;

/// Summary of one metric over a window. All-null when the window holds no
/// non-null samples for the metric; an empty window is a valid result, not
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainSummary {
    pub max: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherStats {
    pub samples: usize,
    pub temperature_c: MetricSummary,
    pub humidity_pct: MetricSummary,
    pub pressure_hpa: MetricSummary,
    pub wind_speed_kmh: MetricSummary,
    pub rain_daily_clicks: RainSummary,
}

/// Round half away from zero at `decimals` places.
fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

fn summarize<F>(rows: &[Reading], decimals: u32, field: F) -> MetricSummary
where
    F: Fn(&Reading) -> Option<f64>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;

    for value in rows.iter().filter_map(&field) {
        min = min.min(value);
        max = max.max(value);
        sum += value;
        count += 1;
    }

    if count == 0 {
        return MetricSummary::default();
    }

    MetricSummary {
        min: Some(round_to(min, decimals)),
        max: Some(round_to(max, decimals)),
        avg: Some(round_to(sum / count as f64, decimals)),
    }
}

/// Compute per-metric summaries over an ordered window of readings.
pub fn aggregate(rows: &[Reading]) -> WeatherStats {
    WeatherStats {
        samples: rows.len(),
        temperature_c: summarize(rows, 1, |r| r.temperature_c),
        humidity_pct: summarize(rows, 1, |r| r.humidity_pct),
        pressure_hpa: summarize(rows, 2, |r| r.pressure_hpa),
        wind_speed_kmh: summarize(rows, 1, |r| r.wind_speed_kmh),
        rain_daily_clicks: RainSummary {
            max: rows.iter().map(|r| r.rain_daily_clicks).max(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temp: Option<f64>, hum: Option<f64>, pres: Option<f64>, clicks: i64) -> Reading {
        Reading {
            id: 0,
            station_id: "wx-station-01".to_string(),
            timestamp: None,
            received_at: 0,
            temperature_c: temp,
            humidity_pct: hum,
            pressure_hpa: pres,
            wind_speed_kmh: None,
            wind_direction_deg: None,
            rain_daily_clicks: clicks,
            battery_v: None,
        }
    }

    #[test]
    fn empty_window_reports_nulls_and_zero_samples() {
        let stats = aggregate(&[]);
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.temperature_c, MetricSummary::default());
        assert_eq!(stats.humidity_pct, MetricSummary::default());
        assert_eq!(stats.pressure_hpa, MetricSummary::default());
        assert_eq!(stats.wind_speed_kmh, MetricSummary::default());
        assert_eq!(stats.rain_daily_clicks.max, None);
    }

    #[test]
    fn min_max_avg_over_present_values() {
        let rows = vec![
            reading(Some(10.0), Some(40.0), Some(1000.0), 1),
            reading(Some(20.0), Some(60.0), Some(1010.0), 4),
            reading(Some(15.0), Some(50.0), Some(1005.0), 2),
        ];
        let stats = aggregate(&rows);
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.temperature_c.min, Some(10.0));
        assert_eq!(stats.temperature_c.max, Some(20.0));
        assert_eq!(stats.temperature_c.avg, Some(15.0));
        assert_eq!(stats.rain_daily_clicks.max, Some(4));
    }

    #[test]
    fn null_fields_are_excluded_per_metric() {
        let rows = vec![
            reading(Some(10.0), None, None, 0),
            reading(None, Some(80.0), None, 0),
        ];
        let stats = aggregate(&rows);
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.temperature_c.avg, Some(10.0));
        assert_eq!(stats.humidity_pct.avg, Some(80.0));
        assert_eq!(stats.pressure_hpa, MetricSummary::default());
    }

    #[test]
    fn rounding_is_one_decimal_for_temperature_two_for_pressure() {
        let rows = vec![
            reading(Some(10.14), None, Some(1013.249), 0),
            reading(Some(10.15), None, Some(1013.252), 0),
        ];
        let stats = aggregate(&rows);
        assert_eq!(stats.temperature_c.min, Some(10.1));
        assert_eq!(stats.temperature_c.max, Some(10.2));
        assert_eq!(stats.pressure_hpa.min, Some(1013.25));
        assert_eq!(stats.pressure_hpa.max, Some(1013.25));
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(-2.25, 1), -2.3);
    }
}
