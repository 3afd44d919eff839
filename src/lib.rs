//! # Product Content Pipeline
//!
//! 把一份原始产品数据加工成三份经过校验的页面文档：
//! FAQ 页（15 个问答）、产品页、与虚构竞品的对比页
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 外部协作方，只暴露能力
//! - `ContentGenerator` / `LlmGenerator` - 生成服务（OpenAI 兼容接口）
//! - `Assembler` / `FileAssembler` - 模板合并 + 写盘
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 纯函数能力，无 I/O
//! - `SchemaValidator` - 结构硬性关卡
//! - `QualityEnforcer` - 去重、评分、充分性检查
//! - `calculators` - 对比页上的确定性数字
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 四个阶段适配器：解析 / FAQ / 内容块 / 对比
//! - 每个适配器：请求 → 生成 → 提取 JSON → 校验，失败时本地有限次重试
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 状态机、FAQ 外层重试、中止时清理输出
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, DocumentKind, OutputPaths};
pub use error::{PipelineError, PipelineResult, StageError, ValidationError, ValidationRule};
pub use infrastructure::{
    Assembler, ContentGenerator, FileAssembler, GenerationRequest, LlmGenerator,
};
pub use orchestrator::{PipelineOrchestrator, PipelineState, RunReport};
