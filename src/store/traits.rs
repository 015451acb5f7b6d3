//! 收藏存储抽象（Curation Store Adapter）
//!
//! 适配器本身不缓存；调用方在每次成功的写操作后重新 list()。
//! 后端错误在这里被统一转成 StoreFailure，不会越过边界。

use async_trait::async_trait;

use crate::core::error::StoreFailure;
use crate::store::SavedPost;

/// 默认的表 / 集合名
pub const DEFAULT_TABLE: &str = "saved_tweets";

#[async_trait]
pub trait PostStore: Send + Sync {
    /// 全部记录，按 created_at 降序
    async fn list(&self) -> Result<Vec<SavedPost>, StoreFailure>;

    /// 新建记录并返回存储分配的 id 与时间戳
    async fn create(&self, content: &str) -> Result<SavedPost, StoreFailure>;

    async fn update(&self, id: &str, content: &str) -> Result<(), StoreFailure>;

    async fn delete(&self, id: &str) -> Result<(), StoreFailure>;

    /// 后端名称（日志用）
    fn backend(&self) -> &'static str;
}
