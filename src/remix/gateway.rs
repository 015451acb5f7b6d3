//! Completion Gateway：把正文套进提示词，发给补全服务，返回原始文本
//!
//! 单次尝试，失败原样包装为 GenerationFailure 交给调用方；不校验模型是否遵守条数与格式。

use std::sync::Arc;

use crate::core::error::GenerationFailure;
use crate::llm::{render_prompt, LlmClient, Message, TWEETS_FROM_POST_PROMPT};

#[derive(Clone)]
pub struct CompletionGateway {
    client: Arc<dyn LlmClient>,
    template: String,
}

impl CompletionGateway {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            template: TWEETS_FROM_POST_PROMPT.to_string(),
        }
    }

    /// 替换提示词模板（需包含 `{post}` 占位符）
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub async fn generate(&self, source_text: &str) -> Result<String, GenerationFailure> {
        let prompt = render_prompt(&self.template, source_text);
        tracing::debug!(model = self.client.model(), chars = source_text.chars().count(), "Requesting completion");

        match self.client.complete(&[Message::user(prompt)]).await {
            Ok(text) => {
                tracing::info!(model = self.client.model(), "Completion received");
                Ok(text)
            }
            Err(e) => {
                tracing::warn!(model = self.client.model(), error = %e, "Completion failed");
                Err(GenerationFailure(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlmClient};

    #[tokio::test]
    async fn test_generate_sends_rendered_prompt() {
        let mock = Arc::new(MockLlmClient::new().with_response("1. A\n2. B"));
        let gateway = CompletionGateway::new(mock.clone());

        let raw = gateway.generate("My blog post").await.unwrap();
        assert_eq!(raw, "1. A\n2. B");
        assert_eq!(mock.calls(), 1);
        let prompt = mock.last_prompt().unwrap();
        assert!(prompt.contains("ghostwriter"));
        assert!(prompt.trim_end().ends_with("My blog post"));
    }

    #[tokio::test]
    async fn test_generate_wraps_failure_without_retry() {
        let mock = Arc::new(MockLlmClient::new().with_error(LlmError::Transport("reset".into())));
        let gateway = CompletionGateway::new(mock.clone()).with_template("T: {post}");

        let err = gateway.generate("x").await.unwrap_err();
        assert_eq!(err.0, LlmError::Transport("reset".into()));
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_prompt().as_deref(), Some("T: x"));
    }
}
