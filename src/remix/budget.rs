//! 推文字数预算
//!
//! 超长只做提示（ValidationGap），从不截断、从不阻止保存或分享。
//! 字数按 Unicode 标量值计数。

use serde::Serialize;

/// 平台单条推文上限
pub const POST_LENGTH_LIMIT: usize = 280;

/// 某段文本相对上限的占用情况
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PostBudget {
    pub limit: usize,
    pub used: usize,
}

/// 超出上限的提示
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationGap {
    pub over_by: usize,
}

impl PostBudget {
    pub fn measure(content: &str, limit: usize) -> Self {
        Self {
            limit,
            used: content.chars().count(),
        }
    }

    /// 剩余字数，超长时为负
    pub fn remaining(&self) -> i64 {
        self.limit as i64 - self.used as i64
    }

    pub fn is_over(&self) -> bool {
        self.used > self.limit
    }

    pub fn gap(&self) -> Option<ValidationGap> {
        self.is_over().then(|| ValidationGap {
            over_by: self.used - self.limit,
        })
    }
}
