use anyhow::Context;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub weather: WeatherConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Ingest key checked against `X-API-Key`. When unset, any non-empty key
    /// is accepted (development mode).
    pub api_key: Option<String>,
    /// Station assumed when a request names none.
    pub default_station_id: String,
    /// Rolling retention window for stored readings, in days.
    pub retention_days: i64,
    /// UTC offset, in minutes east, that defines the local calendar day for
    /// the daily rain rollover. Explicit so deployments behave identically
    /// regardless of host locale.
    pub rollover_utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_entries: u64,
    pub ttl_secs: u64,
}

impl WeatherConfig {
    /// The configured offset as a chrono type. Out-of-range minutes fall
    /// back to UTC.
    pub fn rollover_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.rollover_utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./pivault.db".to_string());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be an integer")?;

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let api_key = std::env::var("WEATHER_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let default_station_id =
            std::env::var("DEFAULT_STATION_ID").unwrap_or_else(|_| "wx-station-01".to_string());

        let retention_days = std::env::var("RETENTION_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .context("RETENTION_DAYS must be an integer")?;

        let rollover_utc_offset_minutes = std::env::var("ROLLOVER_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| "0".to_string())
            .parse::<i32>()
            .context("ROLLOVER_UTC_OFFSET_MINUTES must be an integer")?;

        let cache_max_entries = std::env::var("CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1000);
        let cache_ttl_secs = std::env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300);

        Ok(Config {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            weather: WeatherConfig {
                api_key,
                default_station_id,
                retention_days,
                rollover_utc_offset_minutes,
            },
            cache: CacheConfig {
                max_entries: cache_max_entries,
                ttl_secs: cache_ttl_secs,
            },
        })
    }
}
