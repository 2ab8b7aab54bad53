//! `SQLite` implementation of [`RainStateStore`].

use std::future::Future;

use chrono::DateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use rainhub_app::ports::RainStateStore;
use rainhub_domain::error::RainHubError;
use rainhub_domain::id::{DeviceId, SourceTag};
use rainhub_domain::rain::{RainLevel, RainState};
use rainhub_domain::time::Timestamp;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`RainState`].
struct Wrapper(RainState);

fn decode_error(err: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

fn decode_timestamp(value: Option<i64>) -> Result<Option<Timestamp>, sqlx::Error> {
    value
        .map(|secs| DateTime::from_timestamp(secs, 0).ok_or(StorageError::InvalidTimestamp(secs)))
        .transpose()
        .map_err(decode_error)
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let level: String = row.try_get("level")?;
        let rain_flag: String = row.try_get("rain_flag")?;
        let sources: String = row.try_get("sources")?;
        let last_rain: Option<i64> = row.try_get("last_rain")?;
        let precipitation_probability: Option<f64> = row.try_get("precipitation_probability")?;
        let pending_deadline: Option<i64> = row.try_get("pending_deadline")?;

        let level = level.parse::<RainLevel>().map_err(decode_error)?;
        let rain_flag = rain_flag.parse::<RainLevel>().map_err(decode_error)?;
        let sources: Vec<SourceTag> = serde_json::from_str(&sources).map_err(decode_error)?;

        Ok(Self(RainState {
            level,
            rain_flag,
            sources,
            last_rain: decode_timestamp(last_rain)?,
            precipitation_probability,
            pending_deadline: decode_timestamp(pending_deadline)?,
        }))
    }
}

const SELECT_BY_ENGINE: &str = "SELECT * FROM rain_state WHERE engine_id = ?";
const UPSERT: &str = "INSERT INTO rain_state \
    (engine_id, level, rain_flag, sources, last_rain, precipitation_probability, pending_deadline, updated_at) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
    ON CONFLICT(engine_id) DO UPDATE SET \
    level = excluded.level, \
    rain_flag = excluded.rain_flag, \
    sources = excluded.sources, \
    last_rain = excluded.last_rain, \
    precipitation_probability = excluded.precipitation_probability, \
    pending_deadline = excluded.pending_deadline, \
    updated_at = excluded.updated_at";

/// `SQLite`-backed rain state store, one row per engine.
#[derive(Debug, Clone)]
pub struct SqliteRainStateStore {
    pool: SqlitePool,
}

impl SqliteRainStateStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RainStateStore for SqliteRainStateStore {
    fn load(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<RainState>, RainHubError>> + Send {
        let pool = self.pool.clone();
        let id = id.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ENGINE)
                .bind(&id)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(row.map(|w| w.0))
        }
    }

    fn save(
        &self,
        id: &DeviceId,
        state: &RainState,
    ) -> impl Future<Output = Result<(), RainHubError>> + Send {
        let pool = self.pool.clone();
        let id = id.to_string();
        let state = state.clone();
        async move {
            let sources = serde_json::to_string(&state.sources).map_err(StorageError::from)?;
            sqlx::query(UPSERT)
                .bind(&id)
                .bind(state.level.to_string())
                .bind(state.rain_flag.to_string())
                .bind(sources)
                .bind(state.last_rain.map(|ts| ts.timestamp()))
                .bind(state.precipitation_probability)
                .bind(state.pending_deadline.map(|ts| ts.timestamp()))
                .bind(chrono::Utc::now().timestamp())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteRainStateStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteRainStateStore::new(db.pool().clone())
    }

    fn raining() -> RainState {
        RainState {
            level: RainLevel::On,
            rain_flag: RainLevel::On,
            sources: vec![
                SourceTag::new(DeviceId::from("s1"), "level"),
                SourceTag::new(DeviceId::from("owm_current"), "change"),
            ],
            last_rain: DateTime::from_timestamp(1_700_000_000, 0),
            precipitation_probability: Some(72.5),
            pending_deadline: None,
        }
    }

    #[tokio::test]
    async fn should_return_none_for_unknown_engine() {
        let store = setup().await;
        let state = store.load(&DeviceId::from("rain")).await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn should_load_saved_state() {
        let store = setup().await;
        let id = DeviceId::from("rain");

        store.save(&id, &raining()).await.unwrap();

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded, raining());
    }

    #[tokio::test]
    async fn should_overwrite_previous_state() {
        let store = setup().await;
        let id = DeviceId::from("rain");
        store.save(&id, &raining()).await.unwrap();

        let cooling = RainState {
            rain_flag: RainLevel::Off,
            sources: Vec::new(),
            pending_deadline: DateTime::from_timestamp(1_700_000_600, 0),
            ..raining()
        };
        store.save(&id, &cooling).await.unwrap();

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded, cooling);
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rain_state")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn should_keep_engines_apart() {
        let store = setup().await;
        store
            .save(&DeviceId::from("garden"), &raining())
            .await
            .unwrap();
        store
            .save(&DeviceId::from("roof"), &RainState::default())
            .await
            .unwrap();

        let garden = store.load(&DeviceId::from("garden")).await.unwrap();
        let roof = store.load(&DeviceId::from("roof")).await.unwrap();
        assert_eq!(garden, Some(raining()));
        assert_eq!(roof, Some(RainState::default()));
    }

    #[tokio::test]
    async fn should_fail_on_corrupted_sources() {
        let store = setup().await;
        sqlx::query(
            "INSERT INTO rain_state (engine_id, level, rain_flag, sources, updated_at) \
             VALUES ('rain', 'on', 'on', 'not json', 0)",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let result = store.load(&DeviceId::from("rain")).await;

        assert!(matches!(result, Err(RainHubError::Storage(_))));
    }
}
