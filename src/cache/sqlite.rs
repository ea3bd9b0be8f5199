//! SQLite-backed cache store (native only).
//!
//! One worker connection lives on a blocking thread; async callers talk to it
//! over a channel and get replies on oneshots.

use super::store::{CacheEntry, CachePolicy, CacheStore};
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::spawn_blocking;

enum StoreMsg {
    Get {
        generation: String,
        key: String,
        resp: oneshot::Sender<Result<Option<CacheEntry>>>,
    },
    Put {
        entry: CacheEntry,
        resp: oneshot::Sender<Result<()>>,
    },
    DeleteOtherGenerations {
        keep: String,
        resp: oneshot::Sender<Result<usize>>,
    },
    ClearGeneration {
        generation: String,
        resp: oneshot::Sender<Result<usize>>,
    },
    Count {
        generation: String,
        resp: oneshot::Sender<Result<usize>>,
    },
}

#[derive(Clone)]
pub struct SqliteStore {
    tx: UnboundedSender<StoreMsg>,
}

impl SqliteStore {
    /// Open (or create) the cache database at `db_path` and start its worker
    pub async fn open(db_path: &str) -> Result<Self> {
        let (tx, mut rx) = unbounded_channel::<StoreMsg>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();
        let path = db_path.to_string();

        spawn_blocking(move || {
            let conn = match init_db(&path) {
                Ok(conn) => {
                    let _ = ready_tx.send(Ok(()));
                    conn
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            log::info!("[cache] sqlite store open at {path}");

            while let Some(msg) = rx.blocking_recv() {
                match msg {
                    StoreMsg::Get {
                        generation,
                        key,
                        resp,
                    } => {
                        let _ = resp.send(get_db(&conn, &generation, &key));
                    }
                    StoreMsg::Put { entry, resp } => {
                        let _ = resp.send(put_db(&conn, &entry));
                    }
                    StoreMsg::DeleteOtherGenerations { keep, resp } => {
                        let res = conn
                            .execute("DELETE FROM cache_entries WHERE generation <> ?", params![keep])
                            .map_err(ClientError::from);
                        let _ = resp.send(res);
                    }
                    StoreMsg::ClearGeneration { generation, resp } => {
                        let res = conn
                            .execute("DELETE FROM cache_entries WHERE generation = ?", params![generation])
                            .map_err(ClientError::from);
                        let _ = resp.send(res);
                    }
                    StoreMsg::Count { generation, resp } => {
                        let res = conn
                            .query_row(
                                "SELECT COUNT(*) FROM cache_entries WHERE generation = ?",
                                params![generation],
                                |row| row.get::<_, i64>(0),
                            )
                            .map(|n| n as usize)
                            .map_err(ClientError::from);
                        let _ = resp.send(res);
                    }
                }
            }
            log::debug!("[cache] sqlite worker stopped");
        });

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self { tx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ClientError::Storage("sqlite worker exited during startup".into())),
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<Result<T>>) -> StoreMsg) -> Result<T> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(build(resp_tx))
            .map_err(|_| ClientError::Storage("sqlite worker is gone".into()))?;
        resp_rx
            .await
            .map_err(|_| ClientError::Storage("sqlite worker dropped the reply".into()))?
    }
}

fn init_db(path: &str) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "busy_timeout", 250)?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS cache_entries(
            generation   TEXT NOT NULL,
            key          TEXT NOT NULL,
            body         TEXT NOT NULL,
            stored_at_ms INTEGER NOT NULL,
            policy       TEXT NOT NULL,
            PRIMARY KEY(generation, key)
        );
        CREATE INDEX IF NOT EXISTS idx_cache_generation ON cache_entries(generation);
        "#,
    )?;
    Ok(conn)
}

fn get_db(conn: &Connection, generation: &str, key: &str) -> Result<Option<CacheEntry>> {
    let row = conn
        .query_row(
            "SELECT body, stored_at_ms, policy FROM cache_entries WHERE generation = ? AND key = ?",
            params![generation, key],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((body, stored_at_ms, policy)) = row else {
        return Ok(None);
    };
    let body = serde_json::from_str(&body)
        .map_err(|e| ClientError::Storage(format!("corrupt cache body for {key}: {e}")))?;
    let stored_at = DateTime::<Utc>::from_timestamp_millis(stored_at_ms).unwrap_or_else(Utc::now);

    Ok(Some(CacheEntry {
        key: key.to_string(),
        generation: generation.to_string(),
        body,
        stored_at,
        policy: policy.parse::<CachePolicy>()?,
    }))
}

fn put_db(conn: &Connection, entry: &CacheEntry) -> Result<()> {
    let body = serde_json::to_string(&entry.body)
        .map_err(|e| ClientError::Storage(format!("unserializable cache body: {e}")))?;
    conn.execute(
        "INSERT OR REPLACE INTO cache_entries(generation,key,body,stored_at_ms,policy) VALUES (?,?,?,?,?)",
        params![
            entry.generation,
            entry.key,
            body,
            entry.stored_at.timestamp_millis(),
            entry.policy.as_str()
        ],
    )?;
    Ok(())
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn get(&self, generation: &str, key: &str) -> Result<Option<CacheEntry>> {
        let (generation, key) = (generation.to_string(), key.to_string());
        self.request(|resp| StoreMsg::Get {
            generation,
            key,
            resp,
        })
        .await
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.request(|resp| StoreMsg::Put { entry, resp }).await
    }

    async fn delete_other_generations(&self, keep: &str) -> Result<usize> {
        let keep = keep.to_string();
        self.request(|resp| StoreMsg::DeleteOtherGenerations { keep, resp })
            .await
    }

    async fn clear_generation(&self, generation: &str) -> Result<usize> {
        let generation = generation.to_string();
        self.request(|resp| StoreMsg::ClearGeneration { generation, resp })
            .await
    }

    async fn count(&self, generation: &str) -> Result<usize> {
        let generation = generation.to_string();
        self.request(|resp| StoreMsg::Count { generation, resp }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(generation: &str, key: &str) -> CacheEntry {
        CacheEntry {
            key: key.into(),
            generation: generation.into(),
            body: json!({"hospitals": [{"name": "Kenyatta"}]}),
            stored_at: Utc::now(),
            policy: CachePolicy::NetworkFirst,
        }
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStore::open(path).await.unwrap();
            store.put(entry("v1", "GET http://h/api/v1/hospitals/")).await.unwrap();
        }

        let store = SqliteStore::open(path).await.unwrap();
        let got = store
            .get("v1", "GET http://h/api/v1/hospitals/")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.body["hospitals"][0]["name"], "Kenyatta");
        assert_eq!(got.policy, CachePolicy::NetworkFirst);
    }

    #[tokio::test]
    async fn generations_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let store = SqliteStore::open(path.to_str().unwrap()).await.unwrap();

        store.put(entry("v1", "GET /a")).await.unwrap();
        store.put(entry("v2", "GET /a")).await.unwrap();
        store.put(entry("v2", "GET /b")).await.unwrap();

        assert_eq!(store.delete_other_generations("v2").await.unwrap(), 1);
        assert_eq!(store.count("v2").await.unwrap(), 2);
        assert_eq!(store.clear_generation("v2").await.unwrap(), 2);
        assert!(store.get("v2", "GET /a").await.unwrap().is_none());
    }
}
