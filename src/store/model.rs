//! 持久化的推文记录

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::remix::budget::PostBudget;

/// 已保存的推文：id 由存储分配，创建后与来源 Candidate 解耦
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPost {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub content: String,
    #[serde(deserialize_with = "timestamp_assume_utc")]
    pub created_at: DateTime<Utc>,
}

impl SavedPost {
    pub fn budget(&self, limit: usize) -> PostBudget {
        PostBudget::measure(&self.content, limit)
    }
}

/// 后端的主键可能是 uuid 字符串，也可能是自增整数
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

/// `timestamptz` 列带时区偏移；`timestamp` 列没有，按 UTC 解释
fn timestamp_assume_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid created_at: {}", raw)))
}

/// 按 created_at 降序排列（稳定排序：时间相同时保持传入顺序）
pub fn sort_newest_first(posts: &mut [SavedPost]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
