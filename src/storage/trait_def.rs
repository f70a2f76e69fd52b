use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{NewReading, RainState, Reading};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Rain totalizer input carried alongside a reading at ingest time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RainInput {
    /// Clicks since the device's previous report.
    pub delta_clicks: i64,
    /// Device cumulative click counter, recorded for diagnostics only.
    pub device_clicks: Option<i64>,
}

/// Result of a committed ingest transaction.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub reading: Reading,
    pub rain: RainState,
}

/// Result of a manual rain reset, with the pre-reset total for audit.
#[derive(Debug, Clone)]
pub struct RainReset {
    pub previous_clicks: i64,
    pub state: RainState,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indexes).
    async fn init(&self) -> StorageResult<()>;

    /// Persist one reading. A single transaction applies the rain totalizer
    /// transition, inserts the reading with its totalizer snapshot, and
    /// purges rows past the retention window. A failure rolls everything
    /// back, so a failed append never leaves a partially updated rain state.
    async fn ingest(
        &self,
        reading: &NewReading,
        rain: RainInput,
        now: DateTime<Utc>,
    ) -> StorageResult<IngestOutcome>;

    /// The most recent reading for a station, or None.
    async fn latest(&self, station: &str) -> StorageResult<Option<Reading>>;

    /// Readings with `received_at >= since`, ascending by `received_at`.
    async fn query_since(
        &self,
        station: &str,
        since: DateTime<Utc>,
    ) -> StorageResult<Vec<Reading>>;

    /// Current rain totalizer state for a station, or None before the first
    /// ingest.
    async fn rain_state(&self, station: &str) -> StorageResult<Option<RainState>>;

    /// Manual rain reset, durable before returning.
    async fn reset_rain(&self, station: &str, now: DateTime<Utc>) -> StorageResult<RainReset>;
}
