//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `REMIX__*` 覆盖（双下划线表示嵌套，如 `REMIX__STORE__BACKEND=sqlite`）。
//! 凭据不进配置文件：`ANTHROPIC_API_KEY` / `SUPABASE_ANON_KEY` 由 Credentials 单独读取。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::StartupError;
use crate::llm::{ANTHROPIC_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::remix::budget::POST_LENGTH_LIMIT;
use crate::remix::session::SessionOptions;
use crate::remix::share::DEFAULT_SHARE_BASE_URL;
use crate::store::DEFAULT_TABLE;

pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub store: StoreSection,
    pub session: SessionSection,
}

/// [llm] 段：模型、输出上限、端点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    pub api_version: String,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: ANTHROPIC_VERSION.to_string(),
        }
    }
}

/// 收藏存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Supabase / PostgREST
    #[default]
    Postgrest,
    Sqlite,
    Memory,
}

/// [store] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: StoreBackend,
    /// PostgREST 项目地址
    pub url: Option<String>,
    pub table: String,
    /// SQLite 文件路径，未设置时用 ./data/remix.db
    pub sqlite_path: Option<PathBuf>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            table: DEFAULT_TABLE.to_string(),
            sqlite_path: None,
        }
    }
}

impl StoreSection {
    pub fn sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("data/remix.db"))
    }
}

/// [session] 段：状态清除窗口、推文上限、分享地址
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// 0 表示状态不自动清除
    pub status_clear_secs: u64,
    pub post_length_limit: usize,
    pub share_base_url: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            status_clear_secs: 3,
            post_length_limit: POST_LENGTH_LIMIT,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}

impl SessionSection {
    pub fn options(&self) -> SessionOptions {
        SessionOptions {
            post_length_limit: self.post_length_limit,
            status_clear_after: Duration::from_secs(self.status_clear_secs),
            share_base_url: self.share_base_url.clone(),
        }
    }
}

/// 从进程环境读取的凭据
#[derive(Clone, Default)]
pub struct Credentials {
    pub anthropic_api_key: Option<String>,
    pub supabase_anon_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| "***"))
            .field("supabase_anon_key", &self.supabase_anon_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    /// 空字符串视为未设置
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            anthropic_api_key: read(ANTHROPIC_API_KEY_ENV),
            supabase_anon_key: read(SUPABASE_ANON_KEY_ENV),
        }
    }

    pub fn require_anthropic(&self) -> Result<&str, StartupError> {
        self.anthropic_api_key
            .as_deref()
            .ok_or(StartupError::MissingCredential(ANTHROPIC_API_KEY_ENV))
    }

    pub fn require_supabase(&self) -> Result<&str, StartupError> {
        self.supabase_anon_key
            .as_deref()
            .ok_or(StartupError::MissingCredential(SUPABASE_ANON_KEY_ENV))
    }
}

/// 从 config 目录加载配置，环境变量 REMIX__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 REMIX__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("REMIX")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.model, DEFAULT_MODEL);
        assert_eq!(cfg.llm.max_tokens, 1024);
        assert_eq!(cfg.store.backend, StoreBackend::Postgrest);
        assert_eq!(cfg.store.table, "saved_tweets");
        assert_eq!(cfg.session.options().status_clear_after, Duration::from_secs(3));
        assert_eq!(cfg.session.post_length_limit, 280);
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("remix.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[llm]\nmax_tokens = 512\n\n[store]\nbackend = \"sqlite\"\nsqlite_path = \"/tmp/x.db\"\n\n[session]\nstatus_clear_secs = 5"
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.llm.max_tokens, 512);
        assert_eq!(cfg.llm.model, DEFAULT_MODEL);
        assert_eq!(cfg.store.backend, StoreBackend::Sqlite);
        assert_eq!(cfg.store.sqlite_path(), PathBuf::from("/tmp/x.db"));
        assert_eq!(cfg.session.status_clear_secs, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_clear_secs_disables_auto_clear() {
        use crate::core::state::{OperationStatus, StatusSlot};

        let section = SessionSection {
            status_clear_secs: 0,
            ..SessionSection::default()
        };
        let mut slot = StatusSlot::new(section.options().status_clear_after);
        slot.set(OperationStatus::Success("Tweet saved!".into()));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(slot.current(), OperationStatus::Success("Tweet saved!".into()));
    }

    #[test]
    fn test_missing_credentials_are_typed_errors() {
        let creds = Credentials::default();
        assert!(matches!(
            creds.require_anthropic(),
            Err(StartupError::MissingCredential(ANTHROPIC_API_KEY_ENV))
        ));
        assert!(matches!(
            creds.require_supabase(),
            Err(StartupError::MissingCredential(SUPABASE_ANON_KEY_ENV))
        ));
        let shown = format!("{:?}", Credentials { anthropic_api_key: Some("secret".into()), supabase_anon_key: None });
        assert!(!shown.contains("secret"));
    }
}
