//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! - `pipeline` - 单个产品的流水线状态机，决定重试还是中止
//! - `state` - 流水线状态
//! - `events` - 注入式事件上报
//! - `cleanup` - 中止时删除已登记的输出
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::PipelineOrchestrator (状态机 + 重试决策)
//!     ↓
//! workflow (四个阶段适配器 + 本地重试)
//!     ↓
//! services (能力层：校验 / 质量 / 确定性计算)
//!     ↓
//! infrastructure (基础设施：生成服务 / 文档组装)
//! ```

pub mod cleanup;
pub mod events;
pub mod pipeline;
pub mod state;

pub use events::{EventSink, PipelineEvent, RecordingEventSink, TracingEventSink};
pub use pipeline::{decide_quality_retry, PipelineOrchestrator, RetryDecision, RunReport};
pub use state::PipelineState;
