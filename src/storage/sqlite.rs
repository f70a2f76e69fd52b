use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::models::{NewReading, RainState, Reading};
use crate::storage::{IngestOutcome, RainInput, RainReset, Storage, StorageResult};
use crate::weather::totalizer;

const READING_COLUMNS: &str = "id, station_id, timestamp, received_at, temperature_c, \
     humidity_pct, pressure_hpa, wind_speed_kmh, wind_direction_deg, rain_daily_clicks, battery_v";

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    retention_days: i64,
    rollover_offset: FixedOffset,
}

impl SqliteStorage {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        retention_days: i64,
        rollover_offset: FixedOffset,
    ) -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
            retention_days,
            rollover_offset,
        })
    }

    fn retention_cutoff(&self, now: DateTime<Utc>) -> i64 {
        (now - Duration::days(self.retention_days)).timestamp()
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                station_id TEXT NOT NULL,
                timestamp TEXT,
                received_at INTEGER NOT NULL,
                temperature_c REAL,
                humidity_pct REAL,
                pressure_hpa REAL,
                wind_speed_kmh REAL,
                wind_direction_deg REAL,
                rain_daily_clicks INTEGER NOT NULL DEFAULT 0,
                battery_v REAL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_readings_station_received \
             ON readings(station_id, received_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rain_states (
                station_id TEXT PRIMARY KEY,
                daily_clicks INTEGER NOT NULL DEFAULT 0,
                last_reset INTEGER NOT NULL,
                last_esp_clicks INTEGER
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn ingest(
        &self,
        reading: &NewReading,
        rain: RainInput,
        now: DateTime<Utc>,
    ) -> StorageResult<IngestOutcome> {
        let mut tx = self.pool.begin().await?;

        let state: Option<RainState> = sqlx::query_as(
            "SELECT station_id, daily_clicks, last_reset, last_esp_clicks \
             FROM rain_states WHERE station_id = ?",
        )
        .bind(&reading.station_id)
        .fetch_optional(&mut *tx)
        .await?;

        let state = totalizer::ingest(
            state,
            &reading.station_id,
            now,
            self.rollover_offset,
            rain.delta_clicks,
            rain.device_clicks,
        );

        sqlx::query(
            r#"
            INSERT INTO rain_states (station_id, daily_clicks, last_reset, last_esp_clicks)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(station_id) DO UPDATE SET
                daily_clicks = excluded.daily_clicks,
                last_reset = excluded.last_reset,
                last_esp_clicks = excluded.last_esp_clicks
            "#,
        )
        .bind(&state.station_id)
        .bind(state.daily_clicks)
        .bind(state.last_reset)
        .bind(state.last_esp_clicks)
        .execute(&mut *tx)
        .await?;

        let received_at = now.timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO readings (
                station_id, timestamp, received_at, temperature_c, humidity_pct,
                pressure_hpa, wind_speed_kmh, wind_direction_deg, rain_daily_clicks, battery_v
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reading.station_id)
        .bind(&reading.timestamp)
        .bind(received_at)
        .bind(reading.temperature_c)
        .bind(reading.humidity_pct)
        .bind(reading.pressure_hpa)
        .bind(reading.wind_speed_kmh)
        .bind(reading.wind_direction_deg)
        .bind(state.daily_clicks)
        .bind(reading.battery_v)
        .execute(&mut *tx)
        .await?;

        // Rolling retention purge rides the same transaction as the append.
        sqlx::query("DELETE FROM readings WHERE station_id = ? AND received_at < ?")
            .bind(&reading.station_id)
            .bind(self.retention_cutoff(now))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let stored = Reading {
            id: result.last_insert_rowid(),
            station_id: reading.station_id.clone(),
            timestamp: reading.timestamp.clone(),
            received_at,
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
            pressure_hpa: reading.pressure_hpa,
            wind_speed_kmh: reading.wind_speed_kmh,
            wind_direction_deg: reading.wind_direction_deg,
            rain_daily_clicks: state.daily_clicks,
            battery_v: reading.battery_v,
        };

        Ok(IngestOutcome {
            reading: stored,
            rain: state,
        })
    }

    async fn latest(&self, station: &str) -> StorageResult<Option<Reading>> {
        let reading = sqlx::query_as::<_, Reading>(&format!(
            "SELECT {READING_COLUMNS} FROM readings \
             WHERE station_id = ? ORDER BY received_at DESC, id DESC LIMIT 1"
        ))
        .bind(station)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(reading)
    }

    async fn query_since(
        &self,
        station: &str,
        since: DateTime<Utc>,
    ) -> StorageResult<Vec<Reading>> {
        let rows = sqlx::query_as::<_, Reading>(&format!(
            "SELECT {READING_COLUMNS} FROM readings \
             WHERE station_id = ? AND received_at >= ? ORDER BY received_at ASC, id ASC"
        ))
        .bind(station)
        .bind(since.timestamp())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn rain_state(&self, station: &str) -> StorageResult<Option<RainState>> {
        let state = sqlx::query_as::<_, RainState>(
            "SELECT station_id, daily_clicks, last_reset, last_esp_clicks \
             FROM rain_states WHERE station_id = ?",
        )
        .bind(station)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(state)
    }

    async fn reset_rain(&self, station: &str, now: DateTime<Utc>) -> StorageResult<RainReset> {
        let mut tx = self.pool.begin().await?;

        let state: Option<RainState> = sqlx::query_as(
            "SELECT station_id, daily_clicks, last_reset, last_esp_clicks \
             FROM rain_states WHERE station_id = ?",
        )
        .bind(station)
        .fetch_optional(&mut *tx)
        .await?;

        let (previous_clicks, state) = totalizer::reset(state, station, now);

        sqlx::query(
            r#"
            INSERT INTO rain_states (station_id, daily_clicks, last_reset, last_esp_clicks)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(station_id) DO UPDATE SET
                daily_clicks = excluded.daily_clicks,
                last_reset = excluded.last_reset,
                last_esp_clicks = excluded.last_esp_clicks
            "#,
        )
        .bind(&state.station_id)
        .bind(state.daily_clicks)
        .bind(state.last_reset)
        .bind(state.last_esp_clicks)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RainReset {
            previous_clicks,
            state,
        })
    }
}
