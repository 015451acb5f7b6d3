//! 错误分类：生成失败 / 存储失败 / 会话非法迁移 / 启动配置错误
//!
//! GenerationFailure 在 Session 边界被转成可见的「合成候选」；StoreFailure 在 Adapter 边界被捕获，
//! 以状态消息的形式交给 Session 或 View。超长内容（ValidationGap）只做提示，见 `remix::budget`。

use thiserror::Error;

use crate::llm::LlmError;

/// 生成失败：包装补全服务返回的具体原因（网络、鉴权、无文本响应）
#[derive(Error, Debug)]
#[error("Generation failed: {0}")]
pub struct GenerationFailure(#[from] pub LlmError);

/// 存储操作种类（用于拼装默认错误消息）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Create,
    Update,
    Delete,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::List => "load",
            StoreOp::Create => "save",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
        }
    }

    /// 后端没有给出消息时的通用文案
    pub fn generic_message(&self) -> String {
        match self {
            StoreOp::List => "Failed to load saved tweets".to_string(),
            other => format!("Failed to {} tweet", other.as_str()),
        }
    }
}

/// 存储失败：优先携带后端返回的消息，没有时使用通用消息
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreFailure {
    pub op: StoreOp,
    pub message: String,
}

impl StoreFailure {
    pub fn new(op: StoreOp, message: impl Into<String>) -> Self {
        Self {
            op,
            message: message.into(),
        }
    }

    /// 后端消息为空时退回通用文案
    pub fn from_backend(op: StoreOp, backend_message: Option<String>) -> Self {
        let message = backend_message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| op.generic_message());
        Self { op, message }
    }
}

/// 会话 / 收藏列表上的非法操作或存储失败（UI 层本应禁用对应按钮，这里返回错误而不是 panic）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurationError {
    #[error("Source text is empty")]
    EmptyInput,

    #[error("A generation request is already in flight")]
    Busy,

    #[error("Unknown candidate: {0}")]
    UnknownCandidate(usize),

    #[error("Unknown saved tweet: {0}")]
    UnknownPost(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(&'static str),

    #[error(transparent)]
    Store(#[from] StoreFailure),
}

/// 启动期错误：凭据缺失、配置加载失败、存储无法打开
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Store setup failed: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_prefers_backend_message() {
        let f = StoreFailure::from_backend(StoreOp::Create, Some("duplicate key".into()));
        assert_eq!(f.to_string(), "duplicate key");
    }

    #[test]
    fn test_store_failure_generic_message() {
        let f = StoreFailure::from_backend(StoreOp::Delete, None);
        assert_eq!(f.message, "Failed to delete tweet");
        let f = StoreFailure::from_backend(StoreOp::Create, Some("   ".into()));
        assert_eq!(f.message, "Failed to save tweet");
    }

    #[test]
    fn test_generation_failure_wraps_cause() {
        let f = GenerationFailure::from(LlmError::NoText);
        assert!(f.to_string().contains("No text response received"));
    }
}
