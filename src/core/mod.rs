//! 核心层：错误分类、会话状态与状态计时、刷新信号、组装器

pub mod builder;
pub mod error;
pub mod signal;
pub mod state;

pub use builder::{create_remix, RemixApp, RemixBuilder};
pub use error::{CurationError, GenerationFailure, StartupError, StoreFailure, StoreOp};
pub use signal::{RefreshSignal, RefreshTrigger, RefreshWatcher};
pub use state::{OperationStatus, SessionPhase, StatusSlot, STATUS_CLEAR_AFTER};
