//! Remix - 长文转推文的生成与整理
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）与凭据
//! - **core**: 错误分类、会话状态、刷新信号、组装器
//! - **llm**: 补全客户端抽象与实现（Anthropic / Mock）、改写提示词
//! - **observability**: 日志初始化
//! - **remix**: 补全网关、候选解析、整理会话状态机、字数预算、分享链接
//! - **store**: 收藏存储抽象与后端（PostgREST / SQLite / 内存）
//! - **view**: 收藏列表视图

pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod remix;
pub mod store;
pub mod view;

pub use crate::core::{create_remix, RemixApp, RemixBuilder};
pub use crate::remix::{Candidate, CurationSession, GenerationOutcome};
pub use crate::store::{PostStore, SavedPost};
pub use crate::view::PersistedCollectionView;
