//! 候选解析：把一次补全的原始多行文本转成有序的 Candidate 序列
//!
//! 规则：按行切分 → 丢弃空白行 → 去掉行首「数字 + 句点 + 可选空白」编号 → trim；
//! 编号只在行的最开头才识别，缩进过的「  3. xx」保留编号文本。
//! id 为保留行中的从 0 开始的位置，顺序与输入一致。

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::remix::budget::PostBudget;

/// 一次生成批次中的候选推文；id 仅在本批次内唯一
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: usize,
    pub content: String,
}

impl Candidate {
    pub fn new(id: usize, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }

    /// 按给定上限计算剩余字数
    pub fn budget(&self, limit: usize) -> PostBudget {
        PostBudget::measure(&self.content, limit)
    }
}

static LIST_MARKER_RE: OnceLock<Regex> = OnceLock::new();

fn list_marker() -> &'static Regex {
    LIST_MARKER_RE.get_or_init(|| Regex::new(r"^\d+\.\s*").unwrap())
}

/// 去掉行首编号；不匹配时原样返回
pub fn strip_list_marker(line: &str) -> &str {
    match list_marker().find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// 解析原始补全文本；没有可用行时返回空序列（不是错误）
pub fn parse(raw: &str) -> Vec<Candidate> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(id, line)| Candidate::new(id, strip_list_marker(line).trim()))
        .collect()
}
