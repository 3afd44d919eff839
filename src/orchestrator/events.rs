//! 流水线事件
//!
//! 编排器通过注入的 `EventSink` 报告进度，不依赖全局状态

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{error, info, warn};

use crate::orchestrator::state::PipelineState;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
    /// FAQ 生成的一次外层尝试没通过质量 / 数量检查
    QualityAttemptFailed {
        attempt: u32,
        max_attempts: u32,
        reason: String,
    },
    Aborted {
        reason: String,
    },
    OutputRemoved {
        path: PathBuf,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PipelineEvent);
}

/// 默认实现：写入 tracing 日志
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StateChanged { from, to } => {
                info!("🔄 状态: {} → {}", from, to);
            }
            PipelineEvent::QualityAttemptFailed {
                attempt,
                max_attempts,
                reason,
            } => {
                warn!("⚠️ FAQ 质量检查未通过 ({}/{}): {}", attempt, max_attempts, reason);
            }
            PipelineEvent::Aborted { reason } => {
                error!("❌ 流水线中止: {}", reason);
            }
            PipelineEvent::OutputRemoved { path } => {
                info!("🗑️ 已删除输出: {}", path.display());
            }
        }
    }
}

/// 把事件记在内存里，供调用方事后检查
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// 依次经过的状态（不含初始状态）
    pub fn states(&self) -> Vec<PipelineState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::StateChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
