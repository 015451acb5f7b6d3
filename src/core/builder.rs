//! 组装器：由配置与凭据构建 Session + 收藏列表
//!
//! 凭据缺失在这里以 StartupError 的形式报告，而不是在模块加载时崩溃。
//! 测试或嵌入场景可用 with_llm / with_store 注入现成组件，此时不再要求对应凭据。

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{AppConfig, Credentials, StoreBackend};
use crate::core::error::StartupError;
use crate::core::signal::RefreshSignal;
use crate::llm::{AnthropicClient, LlmClient};
use crate::remix::gateway::CompletionGateway;
use crate::remix::session::CurationSession;
use crate::store::{InMemoryStore, PostStore, PostgrestStore, SqliteStore};
use crate::view::PersistedCollectionView;

pub struct RemixBuilder {
    config: AppConfig,
    credentials: Credentials,
    llm: Option<Arc<dyn LlmClient>>,
    store: Option<Arc<dyn PostStore>>,
}

impl RemixBuilder {
    pub fn new(config: AppConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
            llm: None,
            store: None,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn PostStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 构建补全客户端
    pub fn build_llm(&self) -> Result<Arc<dyn LlmClient>, StartupError> {
        if let Some(llm) = &self.llm {
            return Ok(llm.clone());
        }
        let key = self.credentials.require_anthropic()?;
        let section = &self.config.llm;
        Ok(Arc::new(
            AnthropicClient::new(key)
                .with_base_url(section.base_url.clone())
                .with_model(section.model.clone())
                .with_max_tokens(section.max_tokens)
                .with_api_version(section.api_version.clone()),
        ))
    }

    /// 按配置选择存储后端
    pub fn build_store(&self) -> Result<Arc<dyn PostStore>, StartupError> {
        if let Some(store) = &self.store {
            return Ok(store.clone());
        }
        let section = &self.config.store;
        let store: Arc<dyn PostStore> = match section.backend {
            StoreBackend::Postgrest => {
                let key = self.credentials.require_supabase()?;
                let url = section
                    .url
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .ok_or_else(|| StartupError::Store("store.url is required for the postgrest backend".into()))?;
                Arc::new(PostgrestStore::new(url, key).with_table(section.table.clone()))
            }
            StoreBackend::Sqlite => {
                let path = section.sqlite_path();
                Arc::new(
                    SqliteStore::open_with_table(&path, &section.table)
                        .map_err(|e| StartupError::Store(format!("{}: {}", path.display(), e)))?,
                )
            }
            StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        };
        tracing::info!(backend = store.backend(), "Store ready");
        Ok(store)
    }

    pub fn build(self) -> Result<RemixApp, StartupError> {
        let llm = self.build_llm()?;
        let store = self.build_store()?;
        let (trigger, watcher) = RefreshSignal::channel();

        let session = CurationSession::new(
            CompletionGateway::new(llm),
            store.clone(),
            trigger,
            self.config.session.options(),
        );
        let view = PersistedCollectionView::new(store, watcher)
            .with_post_length_limit(self.config.session.post_length_limit);

        Ok(RemixApp { session, view })
    }
}

/// 组装好的两个组件：它们只通过刷新信号联系
pub struct RemixApp {
    pub session: CurationSession,
    pub view: PersistedCollectionView,
}

/// 便捷函数：加载配置与环境凭据后构建
pub fn create_remix(config_path: Option<PathBuf>) -> Result<RemixApp, StartupError> {
    let config = crate::config::load_config(config_path)?;
    RemixBuilder::new(config, Credentials::from_env()).build()
}
