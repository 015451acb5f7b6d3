//! SQLite 收藏存储（rusqlite，同步 API 放进 spawn_blocking）
//!
//! 表结构与远端一致：`saved_tweets(id TEXT PRIMARY KEY, content TEXT, created_at TEXT)`；
//! created_at 以定宽 RFC3339（微秒，Z 结尾）保存，字典序即时间序。

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::core::error::{StoreFailure, StoreOp};
use crate::store::{PostStore, SavedPost, DEFAULT_TABLE};

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteStore {
    /// 打开（或创建）数据库文件；父目录不存在时自动创建
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreFailure> {
        Self::open_with_table(path, DEFAULT_TABLE)
    }

    pub fn open_with_table(path: impl AsRef<Path>, table: &str) -> Result<Self, StoreFailure> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreFailure::new(StoreOp::List, e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(|e| StoreFailure::new(StoreOp::List, e.to_string()))?;
        Self::with_connection(conn, table)
    }

    pub fn in_memory() -> Result<Self, StoreFailure> {
        let conn = Connection::open_in_memory().map_err(|e| StoreFailure::new(StoreOp::List, e.to_string()))?;
        Self::with_connection(conn, DEFAULT_TABLE)
    }

    /// 表名只允许字母、数字与下划线
    pub fn with_connection(conn: Connection, table: &str) -> Result<Self, StoreFailure> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StoreFailure::new(StoreOp::List, format!("Invalid table name: {}", table)));
        }
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at);"
        ))
        .map_err(|e| StoreFailure::new(StoreOp::List, e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: table.to_string(),
        })
    }

    /// 以指定时间戳写入一条记录（导入或测试用）
    pub async fn insert_with_timestamp(
        &self,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<SavedPost, StoreFailure> {
        let post = SavedPost {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at,
        };
        let sql = format!("INSERT INTO {} (id, content, created_at) VALUES (?1, ?2, ?3)", self.table);
        let row = post.clone();
        self.run(StoreOp::Create, move |conn| {
            conn.execute(&sql, params![row.id, row.content, encode_ts(&row.created_at)])?;
            Ok(())
        })
        .await?;
        Ok(post)
    }

    /// 在阻塞线程上执行一次数据库操作，并把 rusqlite 错误转成 StoreFailure
    async fn run<T, F>(&self, op: StoreOp, f: F) -> Result<T, StoreFailure>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let joined = tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreFailure::new(op, "SQLite connection poisoned"))?;
            f(&guard).map_err(|e| StoreFailure::from_backend(op, Some(e.to_string())))
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(e) => Err(StoreFailure::from_backend(op, Some(e.to_string()))),
        }
    }
}

fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn list(&self) -> Result<Vec<SavedPost>, StoreFailure> {
        let sql = format!(
            "SELECT id, content, created_at FROM {} ORDER BY created_at DESC, rowid DESC",
            self.table
        );
        self.run(StoreOp::List, move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                let raw_ts: String = row.get(2)?;
                Ok(SavedPost {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    created_at: decode_ts(&raw_ts)?,
                })
            })?;
            let posts = rows.collect::<rusqlite::Result<Vec<_>>>();
            posts
        })
        .await
    }

    async fn create(&self, content: &str) -> Result<SavedPost, StoreFailure> {
        self.insert_with_timestamp(content, Utc::now()).await
    }

    async fn update(&self, id: &str, content: &str) -> Result<(), StoreFailure> {
        let sql = format!("UPDATE {} SET content = ?1 WHERE id = ?2", self.table);
        let (id, content) = (id.to_string(), content.to_string());
        let lookup = id.clone();
        let changed = self
            .run(StoreOp::Update, move |conn| conn.execute(&sql, params![content, id]))
            .await?;
        if changed == 0 {
            return Err(StoreFailure::new(StoreOp::Update, format!("Tweet not found: {}", lookup)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreFailure> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table);
        let id = id.to_string();
        let lookup = id.clone();
        let changed = self
            .run(StoreOp::Delete, move |conn| conn.execute(&sql, params![id]))
            .await?;
        if changed == 0 {
            return Err(StoreFailure::new(StoreOp::Delete, format!("Tweet not found: {}", lookup)));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sqlite_round_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("tweets.db");

        let store = SqliteStore::open(&db_path).unwrap();
        let saved = store.create("persist me").await.unwrap();
        drop(store);

        let reopened = SqliteStore::open(&db_path).unwrap();
        let posts = reopened.list().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, saved.id);
        assert_eq!(posts[0].content, "persist me");
    }

    #[tokio::test]
    async fn test_sqlite_orders_by_created_at_desc() {
        let store = SqliteStore::in_memory().unwrap();
        let base = Utc::now();
        store.insert_with_timestamp("b", base).await.unwrap();
        store.insert_with_timestamp("c", base + Duration::seconds(5)).await.unwrap();
        store.insert_with_timestamp("a", base - Duration::days(2)).await.unwrap();
        store.insert_with_timestamp("b2", base).await.unwrap();

        let contents: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.content).collect();
        assert_eq!(contents, vec!["c", "b2", "b", "a"]);
    }

    #[tokio::test]
    async fn test_sqlite_update_delete_missing() {
        let store = SqliteStore::in_memory().unwrap();
        let post = store.create("x").await.unwrap();

        store.update(&post.id, "y").await.unwrap();
        assert_eq!(store.list().await.unwrap()[0].content, "y");

        store.delete(&post.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.delete(&post.id).await.unwrap_err().op, StoreOp::Delete);
        assert_eq!(store.update(&post.id, "z").await.unwrap_err().op, StoreOp::Update);
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(SqliteStore::with_connection(conn, "tweets; DROP").is_err());
    }
}
