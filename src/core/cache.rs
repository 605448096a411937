//! Response cache keyed by request fingerprint.
//!
//! Two backends share one expiry contract: an entry is served only while
//! `now <= expires_at`, and stale entries are dropped on the read that finds them.
//! The SQLite backend survives process restarts; the memory backend does not.
//! SQLite calls block, so they run on tokio's blocking pool.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::RwLock;
use url::Url;

use crate::core::YfError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS responses (
    key        TEXT PRIMARY KEY,
    body       TEXT NOT NULL,
    expires_at INTEGER NOT NULL
)";

/// Builds the cache key for a GET request.
///
/// The `crumb` query parameter rotates with every cookie handshake, so it is left
/// out of the key; everything else (path and remaining parameters) is kept in order.
pub(crate) fn fingerprint(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "crumb")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut clean = url.clone();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs.iter());
    }
    format!("GET {clean}")
}

#[derive(Debug)]
struct MemoryEntry {
    body: String,
    expires_at: Instant,
}

#[derive(Debug)]
enum Backend {
    Memory(RwLock<HashMap<String, MemoryEntry>>),
    Sqlite(Arc<Mutex<Connection>>),
}

#[derive(Debug)]
pub(crate) struct CacheStore {
    backend: Backend,
    default_ttl: Duration,
}

impl CacheStore {
    pub(crate) fn memory(default_ttl: Duration) -> Self {
        Self {
            backend: Backend::Memory(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    pub(crate) fn sqlite(path: &Path, default_ttl: Duration) -> Result<Self, YfError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "opened sqlite response cache");
        Ok(Self {
            backend: Backend::Sqlite(Arc::new(Mutex::new(conn))),
            default_ttl,
        })
    }

    pub(crate) fn is_persistent(&self) -> bool {
        matches!(self.backend, Backend::Sqlite(_))
    }

    /// Returns the cached body for `key` if it has not expired.
    ///
    /// Store failures are logged and reported as a miss; the cache never fails a request.
    pub(crate) async fn get(&self, key: &str) -> Option<String> {
        match &self.backend {
            Backend::Memory(map) => {
                {
                    let guard = map.read().await;
                    match guard.get(key) {
                        Some(entry) if Instant::now() <= entry.expires_at => {
                            return Some(entry.body.clone());
                        }
                        Some(_) => {}
                        None => return None,
                    }
                }
                map.write().await.remove(key);
                None
            }
            Backend::Sqlite(conn) => {
                let now = Utc::now().timestamp_millis();
                let owned = key.to_string();
                match blocking(conn, move |c| sqlite_get(c, &owned, now)).await {
                    Ok(hit) => hit,
                    Err(e) => {
                        tracing::warn!(
                            key,
                            error = %e,
                            "response cache read failed; treating as miss"
                        );
                        None
                    }
                }
            }
        }
    }

    pub(crate) async fn put(&self, key: &str, body: &str) {
        let ttl = self.default_ttl;
        match &self.backend {
            Backend::Memory(map) => {
                let entry = MemoryEntry {
                    body: body.to_string(),
                    expires_at: Instant::now() + ttl,
                };
                map.write().await.insert(key.to_string(), entry);
            }
            Backend::Sqlite(conn) => {
                let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
                let expires_at = Utc::now().timestamp_millis().saturating_add(ttl_ms);
                let (owned, body) = (key.to_string(), body.to_string());
                let res = blocking(conn, move |c| sqlite_put(c, &owned, &body, expires_at)).await;
                if let Err(e) = res {
                    tracing::warn!(key, error = %e, "response cache write failed");
                }
            }
        }
    }

    /// Removes every entry.
    pub(crate) async fn clear(&self) -> Result<(), YfError> {
        match &self.backend {
            Backend::Memory(map) => map.write().await.clear(),
            Backend::Sqlite(conn) => {
                blocking(conn, |c| c.execute("DELETE FROM responses", [])).await?;
            }
        }
        Ok(())
    }

    /// Removes expired entries and returns how many were dropped.
    pub(crate) async fn purge_expired(&self) -> Result<usize, YfError> {
        match &self.backend {
            Backend::Memory(map) => {
                let now = Instant::now();
                let mut guard = map.write().await;
                let before = guard.len();
                guard.retain(|_, e| now <= e.expires_at);
                Ok(before - guard.len())
            }
            Backend::Sqlite(conn) => {
                let now = Utc::now().timestamp_millis();
                blocking(conn, move |c| {
                    c.execute("DELETE FROM responses WHERE expires_at < ?1", params![now])
                })
                .await
            }
        }
    }
}

fn lock(conn: &Mutex<Connection>) -> std::sync::MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `op` against the shared connection on the blocking pool.
async fn blocking<T, F>(conn: &Arc<Mutex<Connection>>, op: F) -> Result<T, YfError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
{
    let conn = Arc::clone(conn);
    let out = tokio::task::spawn_blocking(move || op(&lock(&conn))).await?;
    Ok(out?)
}

fn sqlite_get(conn: &Connection, key: &str, now: i64) -> rusqlite::Result<Option<String>> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT body, expires_at FROM responses WHERE key = ?1",
            params![key],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;

    match row {
        Some((body, expires_at)) if now <= expires_at => Ok(Some(body)),
        Some(_) => {
            conn.execute("DELETE FROM responses WHERE key = ?1", params![key])?;
            Ok(None)
        }
        None => Ok(None),
    }
}

fn sqlite_put(conn: &Connection, key: &str, body: &str, expires_at: i64) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO responses (key, body, expires_at) VALUES (?1, ?2, ?3)",
        params![key, body, expires_at],
    )?;
    Ok(())
}
