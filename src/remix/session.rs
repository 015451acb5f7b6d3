//! Curation Session：一次生成批次的内存生命周期
//!
//! 状态机：Idle → Generating → Reviewing ⇄ Editing(id)
//!
//! - submit 拆成 begin_submit / finish_submit 两步，宿主可以把网络请求放到别处执行；
//!   每次 begin 领取单调递增的 ticket，finish 时 ticket 不是最新的结果直接丢弃。
//! - 生成失败不向上抛错，而是变成一条可见的合成候选，同时记录 GenerationOutcome::Failed。
//! - save 是复制而不是移动：成功后批次保持原样，并通过 RefreshTrigger 通知收藏列表重新加载。
//! - discard 只从当前批次移除候选，其余候选的 id 不变，也不访问存储。
//! - 操作状态同一时刻只有一个，固定窗口后自动清除。

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::core::error::{CurationError, GenerationFailure};
use crate::core::signal::RefreshTrigger;
use crate::core::state::{OperationStatus, SessionPhase, StatusSlot, STATUS_CLEAR_AFTER};
use crate::remix::budget::{PostBudget, POST_LENGTH_LIMIT};
use crate::remix::gateway::CompletionGateway;
use crate::remix::parser::{parse, Candidate};
use crate::remix::share::{share_intent_url, DEFAULT_SHARE_BASE_URL};
use crate::store::{PostStore, SavedPost};

/// 生成失败时合成候选的固定前缀
pub const GENERATION_FAILED_MESSAGE: &str = "Something went wrong! Please try again.";

/// 保存成功的提示
pub const SAVED_MESSAGE: &str = "Tweet saved!";

/// 最近一次生成的结果标签（比合成候选更严格的类型化视图）
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum GenerationOutcome {
    /// 尚未生成
    None,
    /// 解析出的候选数量
    Candidates(usize),
    /// 补全成功但没有可用行
    Empty,
    Failed(String),
}

/// 一次生成请求的凭证
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationTicket {
    id: u64,
    source_text: String,
}

impl GenerationTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }
}

/// Session 的可调参数
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub post_length_limit: usize,
    pub status_clear_after: Duration,
    pub share_base_url: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            post_length_limit: POST_LENGTH_LIMIT,
            status_clear_after: STATUS_CLEAR_AFTER,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}

pub struct CurationSession {
    gateway: CompletionGateway,
    store: Arc<dyn PostStore>,
    refresh: RefreshTrigger,
    options: SessionOptions,

    source_text: String,
    candidates: Vec<Candidate>,
    outcome: GenerationOutcome,
    phase: SessionPhase,
    pending_edit: String,
    status: StatusSlot,

    /// 最近发出的 ticket
    latest_ticket: u64,
    in_flight: Option<u64>,
}

impl CurationSession {
    pub fn new(
        gateway: CompletionGateway,
        store: Arc<dyn PostStore>,
        refresh: RefreshTrigger,
        options: SessionOptions,
    ) -> Self {
        let status = StatusSlot::new(options.status_clear_after);
        Self {
            gateway,
            store,
            refresh,
            options,
            source_text: String::new(),
            candidates: Vec::new(),
            outcome: GenerationOutcome::None,
            phase: SessionPhase::Idle,
            pending_edit: String::new(),
            status,
            latest_ticket: 0,
            in_flight: None,
        }
    }

    // ---------- 读取 ----------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_generating(&self) -> bool {
        self.phase == SessionPhase::Generating
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: usize) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn outcome(&self) -> &GenerationOutcome {
        &self.outcome
    }

    pub fn editing_id(&self) -> Option<usize> {
        match self.phase {
            SessionPhase::Editing(id) => Some(id),
            _ => None,
        }
    }

    pub fn pending_edit(&self) -> &str {
        &self.pending_edit
    }

    /// 当前可见状态（过期即为 None）
    pub fn status(&self) -> OperationStatus {
        self.status.current()
    }

    /// 清掉已过期的状态，返回是否发生清除
    pub fn expire_status(&mut self) -> bool {
        self.status.expire()
    }

    pub fn budget(&self, id: usize) -> Option<PostBudget> {
        self.candidate(id)
            .map(|c| c.budget(self.options.post_length_limit))
    }

    /// 编辑缓冲区相对上限的占用（编辑时实时显示剩余字数）
    pub fn pending_budget(&self) -> PostBudget {
        PostBudget::measure(&self.pending_edit, self.options.post_length_limit)
    }

    // ---------- 生成 ----------

    pub fn set_source_text(&mut self, text: impl Into<String>) {
        self.source_text = text.into();
    }

    /// 进入 Generating 并领取 ticket；输入为空或已有请求在途时拒绝
    pub fn begin_submit(&mut self) -> Result<GenerationTicket, CurationError> {
        if self.is_generating() {
            return Err(CurationError::Busy);
        }
        if self.source_text.trim().is_empty() {
            return Err(CurationError::EmptyInput);
        }

        if let SessionPhase::Editing(id) = self.phase {
            tracing::debug!(candidate = id, "Dropping edit buffer for new generation");
            self.pending_edit.clear();
        }

        self.latest_ticket += 1;
        self.in_flight = Some(self.latest_ticket);
        self.phase = SessionPhase::Generating;
        tracing::debug!(ticket = self.latest_ticket, "Generation started");

        Ok(GenerationTicket {
            id: self.latest_ticket,
            source_text: self.source_text.clone(),
        })
    }

    /// 应用生成结果；ticket 过期时丢弃并返回 false
    pub fn finish_submit(
        &mut self,
        ticket: &GenerationTicket,
        result: Result<String, GenerationFailure>,
    ) -> bool {
        if self.in_flight != Some(ticket.id) || ticket.id != self.latest_ticket {
            tracing::warn!(
                ticket = ticket.id,
                latest = self.latest_ticket,
                "Discarding stale generation response"
            );
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(raw) => {
                self.candidates = parse(&raw);
                self.outcome = if self.candidates.is_empty() {
                    GenerationOutcome::Empty
                } else {
                    GenerationOutcome::Candidates(self.candidates.len())
                };
                tracing::info!(count = self.candidates.len(), "Generation batch ready");
            }
            Err(failure) => {
                let reason = failure.to_string();
                tracing::warn!(error = %reason, "Generation failed, showing fallback entry");
                self.candidates = vec![Candidate::new(
                    0,
                    format!("{} ({})", GENERATION_FAILED_MESSAGE, failure.0),
                )];
                self.outcome = GenerationOutcome::Failed(reason);
            }
        }

        self.pending_edit.clear();
        self.phase = SessionPhase::Reviewing;
        true
    }

    /// 放弃在途请求：回到可输入状态，迟到的响应会被 finish_submit 丢弃
    pub fn abandon_generation(&mut self) -> bool {
        if !self.is_generating() {
            return false;
        }
        tracing::debug!(ticket = ?self.in_flight, "Generation abandoned");
        self.in_flight = None;
        self.phase = self.resting_phase();
        true
    }

    /// 一次完整的提交：设置正文 → 请求补全 → 应用结果
    pub async fn submit(&mut self, source_text: impl Into<String>) -> Result<&GenerationOutcome, CurationError> {
        if self.is_generating() {
            return Err(CurationError::Busy);
        }
        self.set_source_text(source_text);
        let ticket = self.begin_submit()?;
        let result = self.gateway.generate(ticket.source_text()).await;
        self.finish_submit(&ticket, result);
        Ok(&self.outcome)
    }

    fn resting_phase(&self) -> SessionPhase {
        if self.outcome == GenerationOutcome::None {
            SessionPhase::Idle
        } else {
            SessionPhase::Reviewing
        }
    }

    // ---------- 编辑 ----------

    /// 仅在 Reviewing 下可进入编辑；当前内容复制进编辑缓冲区
    pub fn start_edit(&mut self, id: usize) -> Result<(), CurationError> {
        match self.phase {
            SessionPhase::Reviewing => {}
            SessionPhase::Editing(_) => {
                return Err(CurationError::InvalidTransition("another candidate is being edited"))
            }
            _ => return Err(CurationError::InvalidTransition("no batch to edit")),
        }
        let content = self
            .candidate(id)
            .map(|c| c.content.clone())
            .ok_or(CurationError::UnknownCandidate(id))?;

        self.pending_edit = content;
        self.phase = SessionPhase::Editing(id);
        tracing::debug!(candidate = id, "Edit started");
        Ok(())
    }

    /// 更新编辑缓冲区（宿主同步用户输入）
    pub fn set_pending_edit(&mut self, text: impl Into<String>) -> Result<(), CurationError> {
        if self.editing_id().is_none() {
            return Err(CurationError::InvalidTransition("not editing"));
        }
        self.pending_edit = text.into();
        Ok(())
    }

    /// 原地替换内容，不做长度截断
    pub fn commit_edit(&mut self, id: usize, new_content: impl Into<String>) -> Result<(), CurationError> {
        if self.editing_id() != Some(id) {
            return Err(CurationError::InvalidTransition("candidate is not being edited"));
        }
        let candidate = self
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CurationError::UnknownCandidate(id))?;

        candidate.content = new_content.into();
        self.pending_edit.clear();
        self.phase = SessionPhase::Reviewing;
        tracing::debug!(candidate = id, "Edit committed");
        Ok(())
    }

    /// 用编辑缓冲区的内容提交
    pub fn commit_pending_edit(&mut self) -> Result<(), CurationError> {
        let id = self
            .editing_id()
            .ok_or(CurationError::InvalidTransition("not editing"))?;
        let content = std::mem::take(&mut self.pending_edit);
        self.commit_edit(id, content)
    }

    pub fn cancel_edit(&mut self) -> Result<(), CurationError> {
        if self.editing_id().is_none() {
            return Err(CurationError::InvalidTransition("not editing"));
        }
        self.pending_edit.clear();
        self.phase = SessionPhase::Reviewing;
        Ok(())
    }

    // ---------- 保存 / 丢弃 / 分享 ----------

    /// 从批次中移除一条候选；正在编辑的候选需先提交或取消
    pub fn discard(&mut self, id: usize) -> Result<Candidate, CurationError> {
        if self.is_generating() {
            return Err(CurationError::Busy);
        }
        if self.editing_id() == Some(id) {
            return Err(CurationError::InvalidTransition("candidate is being edited"));
        }
        let index = self
            .candidates
            .iter()
            .position(|c| c.id == id)
            .ok_or(CurationError::UnknownCandidate(id))?;

        let removed = self.candidates.remove(index);
        tracing::debug!(candidate = id, left = self.candidates.len(), "Candidate discarded");
        Ok(removed)
    }

    /// 复制候选内容到存储；结果同时写入操作状态
    pub async fn save(&mut self, id: usize) -> Result<SavedPost, CurationError> {
        let content = self
            .candidate(id)
            .map(|c| c.content.clone())
            .ok_or(CurationError::UnknownCandidate(id))?;

        match self.store.create(&content).await {
            Ok(post) => {
                tracing::info!(candidate = id, post = %post.id, backend = self.store.backend(), "Tweet saved");
                self.status.set(OperationStatus::Success(SAVED_MESSAGE.to_string()));
                self.refresh.notify();
                Ok(post)
            }
            Err(failure) => {
                tracing::warn!(candidate = id, error = %failure, "Saving tweet failed");
                self.status.set(OperationStatus::Error(failure.message.clone()));
                Err(CurationError::Store(failure))
            }
        }
    }

    /// 发推意图 URL（打开链接由宿主负责）
    pub fn share(&self, id: usize) -> Result<String, CurationError> {
        self.candidate(id)
            .map(|c| share_intent_url(&self.options.share_base_url, &c.content))
            .ok_or(CurationError::UnknownCandidate(id))
    }
}
