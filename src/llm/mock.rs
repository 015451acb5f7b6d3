//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按顺序返回预置的响应；队列耗尽后回显最后一条 User 消息为单条编号推文。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message, Role};

/// Mock 客户端：脚本化响应 + 调用计数
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条成功响应
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// 追加一条失败响应
    pub fn with_error(self, err: LlmError) -> Self {
        self.push(Err(err));
        self
    }

    pub fn push(&self, item: Result<String, LlmError>) {
        if let Ok(mut q) = self.script.lock() {
            q.push_back(item);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 最近一次收到的 user 内容
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "(no input)".to_string());

        if let Ok(mut p) = self.last_prompt.lock() {
            *p = Some(last_user.clone());
        }

        let scripted = self.script.lock().ok().and_then(|mut q| q.pop_front());
        match scripted {
            Some(item) => item,
            None => Ok(format!("1. Echo from Mock: {}", last_user.trim())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_echo() {
        let mock = MockLlmClient::new()
            .with_response("1. A")
            .with_error(LlmError::NoText);

        assert_eq!(mock.complete(&[Message::user("x")]).await.unwrap(), "1. A");
        assert_eq!(
            mock.complete(&[Message::user("x")]).await.unwrap_err(),
            LlmError::NoText
        );
        assert_eq!(
            mock.complete(&[Message::user("ping")]).await.unwrap(),
            "1. Echo from Mock: ping"
        );
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.last_prompt().as_deref(), Some("ping"));
    }
}
