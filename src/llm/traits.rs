//! LLM 客户端抽象
//!
//! 所有后端（Anthropic Messages API / Mock）实现 LlmClient：单次 complete，不重试、不覆盖超时。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::Message;

/// 补全服务的失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// 网络层失败（连接、超时、TLS 等）
    #[error("Network error: {0}")]
    Transport(String),

    /// 凭据无效（401 / 403）
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// 其他非 2xx 响应
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 响应无法解析
    #[error("Invalid response: {0}")]
    Decode(String),

    /// 首个内容块不是文本
    #[error("No text response received")]
    NoText,
}

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 发送消息并返回首个文本块
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 模型标识（日志用）
    fn model(&self) -> &str {
        "unknown"
    }
}
