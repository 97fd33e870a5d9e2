use crate::domain::DrugId;
use crate::error::{StoreError, StoreResult};
use crate::models::{AnalyticsAction, SearchHistoryEntry};
use crate::repositories::traits::UserDataStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite-backed user data store.
///
/// The connection is guarded by a mutex and every statement runs on
/// `tokio::task::spawn_blocking`, so callers never block the async runtime.
#[derive(Clone)]
pub struct SqliteUserDataStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserDataStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS bookmarks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                drug_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, drug_id)
            );

            CREATE TABLE IF NOT EXISTS search_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                search_term TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS analytics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                action TEXT NOT NULL,
                drug_id TEXT,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_bookmarks_user ON bookmarks(user_id);
            CREATE INDEX IF NOT EXISTS idx_history_user ON search_history(user_id);
        "#,
        )?;
        Ok(())
    }

    /// Run a closure against the connection on the blocking pool.
    async fn run<F, R>(&self, f: F) -> StoreResult<R>
    where
        F: FnOnce(&Connection) -> StoreResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Other("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Task(format!("Task join error: {}", e)))?
    }

    /// Number of analytics events recorded for a user with the given action.
    pub async fn count_events(&self, user: &str, action: AnalyticsAction) -> StoreResult<usize> {
        let user = user.to_string();
        self.run(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM analytics WHERE user_id = ?1 AND action = ?2",
                (&user, action.as_str()),
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
        .await
    }
}

#[async_trait]
impl UserDataStore for SqliteUserDataStore {
    async fn get_bookmarks(&self, user: &str) -> StoreResult<Vec<DrugId>> {
        let user = user.to_string();
        self.run(move |conn| {
            let mut stmt =
                conn.prepare("SELECT drug_id FROM bookmarks WHERE user_id = ?1 ORDER BY id")?;
            let raw: Vec<String> = stmt
                .query_map([&user], |row| row.get(0))?
                .collect::<Result<_, _>>()?;
            raw.into_iter()
                .map(|s| {
                    DrugId::new(&s)
                        .map_err(|e| StoreError::Corrupt(format!("bookmark {:?}: {}", s, e)))
                })
                .collect()
        })
        .await
    }

    async fn add_bookmark(&self, user: &str, id: &DrugId) -> StoreResult<()> {
        let user = user.to_string();
        let id = id.to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO bookmarks (user_id, drug_id, created_at) VALUES (?1, ?2, ?3)",
                (&user, &id, Utc::now().to_rfc3339()),
            )?;
            Ok(())
        })
        .await
    }

    async fn remove_bookmark(&self, user: &str, id: &DrugId) -> StoreResult<()> {
        let user = user.to_string();
        let id = id.to_string();
        self.run(move |conn| {
            conn.execute(
                "DELETE FROM bookmarks WHERE user_id = ?1 AND drug_id = ?2",
                (&user, &id),
            )?;
            Ok(())
        })
        .await
    }

    async fn append_history(&self, user: &str, query: &str) -> StoreResult<()> {
        let user = user.to_string();
        let query = query.to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO search_history (user_id, search_term, timestamp) VALUES (?1, ?2, ?3)",
                (&user, &query, Utc::now().to_rfc3339()),
            )?;
            Ok(())
        })
        .await
    }

    async fn recent_history(&self, user: &str, limit: usize) -> StoreResult<Vec<SearchHistoryEntry>> {
        let user = user.to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT search_term, timestamp FROM search_history
                 WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
            )?;
            let raw: Vec<(String, String)> = stmt
                .query_map((&user, limit), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<_, _>>()?;
            raw.into_iter()
                .map(|(term, ts)| {
                    let timestamp = DateTime::parse_from_rfc3339(&ts)
                        .map_err(|e| StoreError::Corrupt(format!("timestamp {:?}: {}", ts, e)))?
                        .with_timezone(&Utc);
                    Ok(SearchHistoryEntry::new(term, timestamp))
                })
                .collect()
        })
        .await
    }

    async fn append_analytics_event(
        &self,
        user: &str,
        action: AnalyticsAction,
        id: Option<&DrugId>,
    ) -> StoreResult<()> {
        let user = user.to_string();
        let id = id.map(|d| d.to_string());
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO analytics (user_id, action, drug_id, timestamp) VALUES (?1, ?2, ?3, ?4)",
                (&user, action.as_str(), &id, Utc::now().to_rfc3339()),
            )?;
            Ok(())
        })
        .await
    }

    async fn clear_session_data(&self, user: &str) -> StoreResult<()> {
        let user = user.to_string();
        self.run(move |conn| {
            conn.execute("DELETE FROM bookmarks WHERE user_id = ?1", [&user])?;
            conn.execute("DELETE FROM search_history WHERE user_id = ?1", [&user])?;
            Ok(())
        })
        .await
    }
}
