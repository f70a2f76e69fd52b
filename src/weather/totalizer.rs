//! Daily rain totalizer transition logic.
//!
//! Pure functions over `RainState` values; the storage layer applies them
//! inside the ingest transaction so a transition and its reading commit
//! atomically. Accumulation is delta-based: the device reports clicks since
//! its previous post, and the server trusts that delta. The device's
//! cumulative counter is recorded only as a diagnostic (`last_esp_clicks`)
//! since it resets whenever the device reboots.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::models::RainState;

/// True when two instants fall on the same calendar day under the configured
/// rollover offset.
pub fn same_local_day(a: i64, b: i64, offset: FixedOffset) -> bool {
    let day = |secs: i64| {
        offset
            .timestamp_opt(secs, 0)
            .single()
            .map(|dt| dt.date_naive())
    };
    match (day(a), day(b)) {
        (Some(da), Some(db)) => da == db,
        // Unrepresentable timestamps force a rollover rather than silently
        // carrying a stale total.
        _ => false,
    }
}

fn fresh_state(station_id: &str, now: DateTime<Utc>) -> RainState {
    RainState {
        station_id: station_id.to_string(),
        daily_clicks: 0,
        last_reset: now.timestamp(),
        last_esp_clicks: None,
    }
}

/// The Ingest transition. Rolls the state over first when `last_reset` falls
/// on an earlier local calendar day, then accumulates the reported delta and
/// records the device's cumulative counter.
pub fn ingest(
    state: Option<RainState>,
    station_id: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
    delta_clicks: i64,
    device_cumulative: Option<i64>,
) -> RainState {
    let mut state = match state {
        Some(s) if same_local_day(s.last_reset, now.timestamp(), offset) => s,
        _ => fresh_state(station_id, now),
    };
    state.daily_clicks += delta_clicks.max(0);
    state.last_esp_clicks = device_cumulative;
    state
}

/// The ManualReset transition. Identical effect to the daily rollover but
/// callable at any time; the caller reports the pre-reset totals for audit.
pub fn reset(state: Option<RainState>, station_id: &str, now: DateTime<Utc>) -> (i64, RainState) {
    let previous_clicks = state.map(|s| s.daily_clicks).unwrap_or(0);
    (previous_clicks, fresh_state(station_id, now))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATION: &str = "wx-station-01";

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn first_ingest_creates_state_lazily() {
        let now = at(2026, 3, 10, 9, 0);
        let state = ingest(None, STATION, now, utc(), 3, Some(120));
        assert_eq!(state.daily_clicks, 3);
        assert_eq!(state.last_reset, now.timestamp());
        assert_eq!(state.last_esp_clicks, Some(120));
    }

    #[test]
    fn same_day_ingests_sum_their_deltas() {
        let morning = at(2026, 3, 10, 9, 0);
        let noon = at(2026, 3, 10, 12, 0);
        let evening = at(2026, 3, 10, 21, 30);

        let state = ingest(None, STATION, morning, utc(), 2, Some(100));
        let state = ingest(Some(state), STATION, noon, utc(), 5, Some(105));
        let state = ingest(Some(state), STATION, evening, utc(), 1, Some(106));

        assert_eq!(state.daily_clicks, 8);
        assert_eq!(state.last_reset, morning.timestamp());
    }

    #[test]
    fn rollover_resets_to_the_first_post_midnight_delta() {
        let yesterday = at(2026, 3, 10, 23, 50);
        let state = ingest(None, STATION, yesterday, utc(), 40, Some(200));
        assert_eq!(state.daily_clicks, 40);

        let after_midnight = at(2026, 3, 11, 0, 5);
        let state = ingest(Some(state), STATION, after_midnight, utc(), 2, Some(202));
        assert_eq!(state.daily_clicks, 2, "stale total must not survive the rollover");
        assert_eq!(state.last_reset, after_midnight.timestamp());
    }

    #[test]
    fn rollover_honors_the_configured_offset() {
        // UTC+120min: 23:30 UTC and 00:30 UTC next day are the same local day
        // (01:30 and 02:30 local).
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let a = at(2026, 3, 10, 23, 30);
        let b = at(2026, 3, 11, 0, 30);
        assert!(same_local_day(a.timestamp(), b.timestamp(), offset));
        assert!(!same_local_day(a.timestamp(), b.timestamp(), utc()));

        let state = ingest(None, STATION, a, offset, 4, None);
        let state = ingest(Some(state), STATION, b, offset, 3, None);
        assert_eq!(state.daily_clicks, 7);
    }

    #[test]
    fn manual_reset_reports_previous_total_and_forces_resync() {
        let now = at(2026, 3, 10, 9, 0);
        let state = ingest(None, STATION, now, utc(), 3, Some(50));

        let later = at(2026, 3, 10, 10, 0);
        let (previous, state) = reset(Some(state), STATION, later);
        assert_eq!(previous, 3);
        assert_eq!(state.daily_clicks, 0);
        assert_eq!(state.last_reset, later.timestamp());
        assert_eq!(state.last_esp_clicks, None);
    }

    #[test]
    fn negative_delta_is_clamped_to_zero() {
        let now = at(2026, 3, 10, 9, 0);
        let state = ingest(None, STATION, now, utc(), -5, None);
        assert_eq!(state.daily_clicks, 0);
    }
}
