//! Persisted Collection View：已保存推文的独立列表
//!
//! 自己持有 items / 加载标记 / 编辑状态 / 折叠状态，不与 Session 共享任何状态。
//! 每次成功的写操作后重新 list()，并且总是以最新的 list() 结果为准。
//! 与 Session 的唯一联系是 RefreshWatcher：收到刷新请求时重新加载。

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::core::error::{CurationError, StoreFailure};
use crate::core::signal::RefreshWatcher;
use crate::remix::budget::{PostBudget, POST_LENGTH_LIMIT};
use crate::store::{PostStore, SavedPost};

/// 渲染用快照
#[derive(Clone, Debug, Serialize)]
pub struct CollectionSnapshot {
    pub items: Vec<SavedPost>,
    pub is_loading: bool,
    pub editing_id: Option<String>,
    pub edit_buffer: String,
    pub collapsed: bool,
    pub last_error: Option<String>,
}

pub struct PersistedCollectionView {
    store: Arc<dyn PostStore>,
    watcher: RefreshWatcher,
    items: Vec<SavedPost>,
    is_loading: bool,
    editing_id: Option<String>,
    edit_buffer: String,
    collapsed: watch::Sender<bool>,
    last_error: Option<String>,
    post_length_limit: usize,
}

impl PersistedCollectionView {
    pub fn new(store: Arc<dyn PostStore>, watcher: RefreshWatcher) -> Self {
        let (collapsed, _) = watch::channel(false);
        Self {
            store,
            watcher,
            items: Vec::new(),
            // 首次加载完成前视为加载中
            is_loading: true,
            editing_id: None,
            edit_buffer: String::new(),
            collapsed,
            last_error: None,
            post_length_limit: POST_LENGTH_LIMIT,
        }
    }

    pub fn with_post_length_limit(mut self, limit: usize) -> Self {
        self.post_length_limit = limit;
        self
    }

    pub fn items(&self) -> &[SavedPost] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn edit_buffer(&self) -> &str {
        &self.edit_buffer
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn budget(&self, id: &str) -> Option<PostBudget> {
        self.find(id).map(|p| p.budget(self.post_length_limit))
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            items: self.items.clone(),
            is_loading: self.is_loading,
            editing_id: self.editing_id.clone(),
            edit_buffer: self.edit_buffer.clone(),
            collapsed: self.is_collapsed(),
            last_error: self.last_error.clone(),
        }
    }

    fn find(&self, id: &str) -> Option<&SavedPost> {
        self.items.iter().find(|p| p.id == id)
    }

    // ---------- 加载 ----------

    /// 重新 list()；失败时保留原有 items
    pub async fn refresh(&mut self) -> Result<(), StoreFailure> {
        self.is_loading = true;
        let result = self.store.list().await;
        self.is_loading = false;

        match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Saved tweets loaded");
                self.items = items;
                self.last_error = None;
                // 正在编辑的记录已被别处删除时退出编辑
                let edited_gone = self
                    .editing_id
                    .as_ref()
                    .is_some_and(|id| !self.items.iter().any(|p| &p.id == id));
                if edited_gone {
                    self.cancel_edit();
                }
                Ok(())
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "Loading saved tweets failed");
                self.last_error = Some(failure.message.clone());
                Err(failure)
            }
        }
    }

    /// 若有未处理的刷新请求则重新加载，返回是否执行了加载
    pub async fn sync(&mut self) -> Result<bool, StoreFailure> {
        if !self.watcher.take_pending() {
            return Ok(false);
        }
        self.refresh().await.map(|_| true)
    }

    /// 持续跟随刷新请求，直到所有触发端被销毁
    ///
    /// 运行期间独占 view，适合放在拥有 view 的后台任务里（结束后把 view 交回）。
    /// 需要同时编辑或删除的宿主应改为在自己的循环里调用 `sync()`。
    pub async fn follow(&mut self) {
        while self.watcher.changed().await {
            if let Err(failure) = self.refresh().await {
                tracing::warn!(
                    version = self.watcher.version(),
                    error = %failure,
                    "Follow refresh failed, waiting for next request"
                );
            }
        }
    }

    // ---------- 编辑 ----------

    pub fn start_edit(&mut self, id: &str) -> Result<(), CurationError> {
        if self.editing_id.is_some() {
            return Err(CurationError::InvalidTransition("another saved tweet is being edited"));
        }
        let content = self
            .find(id)
            .map(|p| p.content.clone())
            .ok_or_else(|| CurationError::UnknownPost(id.to_string()))?;
        self.editing_id = Some(id.to_string());
        self.edit_buffer = content;
        Ok(())
    }

    pub fn set_edit_buffer(&mut self, text: impl Into<String>) -> Result<(), CurationError> {
        if self.editing_id.is_none() {
            return Err(CurationError::InvalidTransition("not editing"));
        }
        self.edit_buffer = text.into();
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
        self.edit_buffer.clear();
    }

    /// 把编辑缓冲区写回存储并重新加载；失败时保持编辑状态以便重试
    pub async fn commit_edit(&mut self) -> Result<(), CurationError> {
        let id = self
            .editing_id
            .clone()
            .ok_or(CurationError::InvalidTransition("not editing"))?;

        if let Err(failure) = self.store.update(&id, &self.edit_buffer).await {
            tracing::warn!(post = %id, error = %failure, "Updating saved tweet failed");
            self.last_error = Some(failure.message.clone());
            return Err(failure.into());
        }

        tracing::info!(post = %id, "Saved tweet updated");
        self.editing_id = None;
        self.edit_buffer.clear();
        self.refresh().await?;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), CurationError> {
        if let Err(failure) = self.store.delete(id).await {
            tracing::warn!(post = %id, error = %failure, "Deleting saved tweet failed");
            self.last_error = Some(failure.message.clone());
            return Err(failure.into());
        }

        tracing::info!(post = %id, "Saved tweet deleted");
        if self.editing_id.as_deref() == Some(id) {
            self.cancel_edit();
        }
        self.refresh().await?;
        Ok(())
    }

    // ---------- 折叠 ----------

    pub fn is_collapsed(&self) -> bool {
        *self.collapsed.borrow()
    }

    /// 状态变化时通知订阅者（例如外层布局回收宽度）
    pub fn set_collapsed(&mut self, collapsed: bool) -> bool {
        self.collapsed.send_if_modified(|current| {
            if *current == collapsed {
                false
            } else {
                *current = collapsed;
                true
            }
        })
    }

    pub fn toggle_collapsed(&mut self) -> bool {
        let next = !self.is_collapsed();
        self.set_collapsed(next);
        next
    }

    pub fn subscribe_collapsed(&self) -> watch::Receiver<bool> {
        self.collapsed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::core::error::StoreOp;
    use crate::core::signal::RefreshSignal;
    use crate::store::InMemoryStore;

    /// 可切换为失败模式的存储
    struct FlakyStore {
        inner: InMemoryStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: InMemoryStore::new(),
                failing: AtomicBool::new(false),
            }
        }

        fn check(&self, op: StoreOp) -> Result<(), StoreFailure> {
            if self.failing.load(Ordering::SeqCst) {
                Err(StoreFailure::from_backend(op, Some("backend down".into())))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl PostStore for FlakyStore {
        async fn list(&self) -> Result<Vec<SavedPost>, StoreFailure> {
            self.check(StoreOp::List)?;
            self.inner.list().await
        }
        async fn create(&self, content: &str) -> Result<SavedPost, StoreFailure> {
            self.check(StoreOp::Create)?;
            self.inner.create(content).await
        }
        async fn update(&self, id: &str, content: &str) -> Result<(), StoreFailure> {
            self.check(StoreOp::Update)?;
            self.inner.update(id, content).await
        }
        async fn delete(&self, id: &str) -> Result<(), StoreFailure> {
            self.check(StoreOp::Delete)?;
            self.inner.delete(id).await
        }
        fn backend(&self) -> &'static str {
            "flaky"
        }
    }

    async fn seeded() -> (Arc<FlakyStore>, PersistedCollectionView, crate::core::signal::RefreshTrigger) {
        let store = Arc::new(FlakyStore::new());
        let now = Utc::now();
        store.inner.insert_with_timestamp("older", now - Duration::minutes(5)).await;
        store.inner.insert_with_timestamp("newer", now).await;

        let (trigger, watcher) = RefreshSignal::channel();
        let mut view = PersistedCollectionView::new(store.clone(), watcher);
        view.refresh().await.unwrap();
        (store, view, trigger)
    }

    #[tokio::test]
    async fn test_refresh_lists_newest_first() {
        let (_, view, _) = seeded().await;
        assert!(!view.is_loading());
        let contents: Vec<&str> = view.items().iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_sync_only_reloads_when_signalled() {
        let (store, mut view, trigger) = seeded().await;
        store.inner.create("external").await.unwrap();

        assert!(!view.sync().await.unwrap());
        assert_eq!(view.items().len(), 2);

        trigger.notify();
        assert!(view.sync().await.unwrap());
        assert_eq!(view.items().len(), 3);
        assert_eq!(view.items()[0].content, "external");
    }

    #[tokio::test]
    async fn test_follow_records_failure_and_returns_view() {
        let (store, view, trigger) = seeded().await;
        let before = view.items().to_vec();

        store.failing.store(true, Ordering::SeqCst);
        let follower = tokio::spawn(async move {
            let mut view = view;
            view.follow().await;
            view
        });
        trigger.notify();
        drop(trigger);

        let view = follower.await.unwrap();
        assert_eq!(view.items(), before.as_slice());
        assert_eq!(view.last_error(), Some("backend down"));
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_items() {
        let (store, mut view, _) = seeded().await;
        let before = view.items().to_vec();

        store.failing.store(true, Ordering::SeqCst);
        assert!(view.refresh().await.is_err());
        assert_eq!(view.items(), before.as_slice());
        assert!(!view.is_loading());
        assert_eq!(view.last_error(), Some("backend down"));
    }

    #[tokio::test]
    async fn test_edit_commit_updates_store_and_reloads() {
        let (store, mut view, _) = seeded().await;
        let id = view.items()[1].id.clone();

        view.start_edit(&id).unwrap();
        assert_eq!(view.edit_buffer(), "older");
        let other = view.items()[0].id.clone();
        assert!(view.start_edit(&other).is_err());

        view.set_edit_buffer("older, edited").unwrap();
        view.commit_edit().await.unwrap();

        assert_eq!(view.editing_id(), None);
        assert_eq!(view.items()[1].content, "older, edited");
        assert_eq!(store.inner.list().await.unwrap()[1].content, "older, edited");
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_edit_state() {
        let (store, mut view, _) = seeded().await;
        let id = view.items()[0].id.clone();
        view.start_edit(&id).unwrap();
        view.set_edit_buffer("draft").unwrap();

        store.failing.store(true, Ordering::SeqCst);
        assert!(view.commit_edit().await.is_err());
        assert_eq!(view.editing_id(), Some(id.as_str()));
        assert_eq!(view.edit_buffer(), "draft");
        assert_eq!(view.items()[0].content, "newer");

        view.cancel_edit();
        assert_eq!(view.editing_id(), None);
    }

    #[tokio::test]
    async fn test_delete_reloads_and_exits_edit() {
        let (_, mut view, _) = seeded().await;
        let id = view.items()[0].id.clone();
        view.start_edit(&id).unwrap();

        view.delete(&id).await.unwrap();
        assert_eq!(view.items().len(), 1);
        assert_eq!(view.editing_id(), None);

        assert!(view.delete("missing").await.is_err());
        assert_eq!(view.items().len(), 1);
        assert!(view.last_error().is_some());
    }

    #[tokio::test]
    async fn test_collapse_notifies_only_on_change() {
        let (_, mut view, _) = seeded().await;
        let mut rx = view.subscribe_collapsed();

        assert!(!view.set_collapsed(false));
        assert!(!rx.has_changed().unwrap());

        assert!(view.toggle_collapsed());
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
        assert!(view.snapshot().collapsed);
        assert_eq!(view.items().len(), 2);
    }
}
