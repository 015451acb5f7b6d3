//! 内存收藏存储：进程内 Vec，适合测试与无后端的本地运行

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::core::error::{StoreFailure, StoreOp};
use crate::store::{sort_newest_first, PostStore, SavedPost};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// 按插入顺序保存
    rows: Mutex<Vec<SavedPost>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定时间戳写入一条记录（导入或测试用）
    pub async fn insert_with_timestamp(&self, content: &str, created_at: DateTime<Utc>) -> SavedPost {
        let post = SavedPost {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at,
        };
        self.rows.lock().await.push(post.clone());
        post
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<SavedPost>, StoreFailure> {
        // 先反转再稳定排序：同一时间戳时后插入的在前
        let mut posts: Vec<SavedPost> = self.rows.lock().await.iter().rev().cloned().collect();
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn create(&self, content: &str) -> Result<SavedPost, StoreFailure> {
        Ok(self.insert_with_timestamp(content, Utc::now()).await)
    }

    async fn update(&self, id: &str, content: &str) -> Result<(), StoreFailure> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreFailure::new(StoreOp::Update, format!("Tweet not found: {}", id)))?;
        row.content = content.to_string();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreFailure> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        if rows.len() == before {
            return Err(StoreFailure::new(StoreOp::Delete, format!("Tweet not found: {}", id)));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_list_is_newest_first_for_any_insert_order() {
        let store = InMemoryStore::new();
        let base = Utc::now();
        store.insert_with_timestamp("mid", base).await;
        store.insert_with_timestamp("old", base - Duration::hours(1)).await;
        store.insert_with_timestamp("new", base + Duration::hours(1)).await;

        let contents: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.content).collect();
        assert_eq!(contents, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_same_timestamp_later_insert_first() {
        let store = InMemoryStore::new();
        let at = Utc::now();
        store.insert_with_timestamp("first", at).await;
        store.insert_with_timestamp("second", at).await;

        let contents: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.content).collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryStore::new();
        let post = store.create("draft").await.unwrap();

        store.update(&post.id, "final").await.unwrap();
        assert_eq!(store.list().await.unwrap()[0].content, "final");

        store.delete(&post.id).await.unwrap();
        assert_eq!(store.len().await, 0);

        let err = store.delete(&post.id).await.unwrap_err();
        assert_eq!(err.op, StoreOp::Delete);
        assert!(store.update("missing", "x").await.is_err());
    }
}
