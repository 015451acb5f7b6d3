//! 状态定义：会话阶段与操作状态
//!
//! OperationStatus 同一时刻只有一个值（None / Success / Error），新状态覆盖旧状态；
//! StatusSlot 在设置后经过固定窗口（默认 3 秒）自动回到 None，时间基于 tokio 时钟，便于测试中暂停/快进。
//! 窗口为 0 表示不自动清除，状态一直保留到被新状态覆盖或手动 clear。

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// 默认的状态自动清除窗口
pub const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(3);

/// 会话阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Idle,
    Generating,
    Reviewing,
    /// 正在编辑的候选 id
    Editing(usize),
}

/// 最近一次操作的结果（供 UI 展示）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Default)]
pub enum OperationStatus {
    #[default]
    None,
    Success(String),
    Error(String),
}

impl OperationStatus {
    pub fn is_none(&self) -> bool {
        matches!(self, OperationStatus::None)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            OperationStatus::None => None,
            OperationStatus::Success(m) | OperationStatus::Error(m) => Some(m),
        }
    }
}

/// 带过期时间的状态槽
#[derive(Clone, Debug)]
pub struct StatusSlot {
    status: OperationStatus,
    set_at: Option<Instant>,
    clear_after: Duration,
}

impl Default for StatusSlot {
    fn default() -> Self {
        Self::new(STATUS_CLEAR_AFTER)
    }
}

impl StatusSlot {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            status: OperationStatus::None,
            set_at: None,
            clear_after,
        }
    }

    /// 设置新状态并重新计时；None 直接清空
    pub fn set(&mut self, status: OperationStatus) {
        self.set_at = if status.is_none() {
            None
        } else {
            Some(Instant::now())
        };
        self.status = status;
    }

    pub fn clear(&mut self) {
        self.set(OperationStatus::None);
    }

    fn is_expired(&self, at: Instant) -> bool {
        !self.clear_after.is_zero() && at.elapsed() >= self.clear_after
    }

    /// 当前可见状态：超过窗口即视为 None
    pub fn current(&self) -> OperationStatus {
        match self.set_at {
            Some(at) if !self.is_expired(at) => self.status.clone(),
            _ => OperationStatus::None,
        }
    }

    /// 到期则真正清空，返回是否发生了清除
    pub fn expire(&mut self) -> bool {
        let expired = self.set_at.is_some_and(|at| self.is_expired(at));
        if expired {
            self.clear();
        }
        expired
    }
}
