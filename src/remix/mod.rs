//! 改写流水线：补全网关 → 候选解析 → 会话状态机，以及字数预算与分享链接

pub mod budget;
pub mod gateway;
pub mod parser;
pub mod session;
pub mod share;

pub use budget::{PostBudget, ValidationGap, POST_LENGTH_LIMIT};
pub use gateway::CompletionGateway;
pub use parser::{parse, Candidate};
pub use session::{
    CurationSession, GenerationOutcome, GenerationTicket, SessionOptions, GENERATION_FAILED_MESSAGE,
    SAVED_MESSAGE,
};
pub use share::{share_intent_url, DEFAULT_SHARE_BASE_URL};
