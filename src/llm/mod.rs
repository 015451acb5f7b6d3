//! LLM 层：客户端抽象与实现（Anthropic Messages API / Mock）以及改写提示词

pub mod anthropic;
pub mod message;
pub mod mock;
pub mod prompt;
pub mod traits;

pub use anthropic::{AnthropicClient, ANTHROPIC_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use message::{Message, Role};
pub use mock::MockLlmClient;
pub use prompt::{render_prompt, TWEETS_FROM_POST_PROMPT};
pub use traits::{LlmClient, LlmError};
