//! Hour-bucketed, file-backed cache for ground-station responses.
//!
//! Each key is stored as `{dir}/{key}.json` holding `{"data": ..., "expiresAt": ms}`.
//! Entries expire at the top of the next wall-clock hour after they were
//! written. Stale entries are left on disk and simply ignored until the next
//! successful write replaces them.

use std::{
    fs,
    marker::PhantomData,
    path::PathBuf,
};

use chrono::{DateTime, Duration, Local, TimeZone, Timelike};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::FetchError;

/// A persisted value together with its absolute expiry (Unix milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    pub expires_at: i64,
}

impl<T> CacheEntry<T> {
    pub fn is_valid_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        now.timestamp_millis() < self.expires_at
    }
}

/// Start of the hour following `now`, in `now`'s own time zone.
///
/// The rounding happens at `now`'s UTC offset, so a boundary that falls in a
/// repeated fall-back hour still resolves. `None` only for out-of-range dates.
pub fn next_hour_boundary<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let shifted = now.fixed_offset() + Duration::hours(1);
    let boundary = shifted.with_minute(0)?.with_second(0)?.with_nanosecond(0)?;
    Some(boundary.with_timezone(&now.timezone()))
}

/// Cache key for a ground-data lookup at the given coordinates.
pub fn ground_data_key(lon: f64, lat: f64) -> String {
    format!("groundData_cache_{lon}_{lat}")
}

#[derive(Debug, Clone)]
pub struct ExpiringCache<T> {
    dir: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T> ExpiringCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), _value: PhantomData }
    }

    /// Read `key` as of the current local time.
    pub fn get(&self, key: &str) -> Option<T> {
        self.get_at(key, &Local::now())
    }

    /// Read `key` as of `now`. Missing, unreadable and expired entries are all misses.
    pub fn get_at<Tz: TimeZone>(&self, key: &str, now: &DateTime<Tz>) -> Option<T> {
        let path = self.entry_path(key);

        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Cache miss for {}: {}", key, e);
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        if !entry.is_valid_at(now) {
            tracing::debug!("Cache entry {} expired", key);
            return None;
        }

        tracing::debug!("Cache hit for {}", key);
        Some(entry.data)
    }

    /// Store `value` under `key`, expiring at the next hour boundary after `now`.
    pub fn put<Tz: TimeZone>(&self, key: &str, value: &T, now: &DateTime<Tz>) -> Result<(), FetchError> {
        let expires = next_hour_boundary(now).ok_or_else(|| {
            FetchError::Cache(format!("No valid hour boundary after {}", now.naive_local()))
        })?;

        let entry = CacheEntry { data: value, expires_at: expires.timestamp_millis() };
        let json = serde_json::to_string(&entry)?;

        fs::create_dir_all(&self.dir)?;
        fs::write(self.entry_path(key), json)?;

        tracing::debug!("Cached {} until {}", key, expires.naive_local());
        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}
