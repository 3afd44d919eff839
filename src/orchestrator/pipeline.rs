//! 流水线编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **状态机**：按固定顺序推进各阶段，记录当前状态
//! 2. **错误归类**：阶段边界上的错误只分"可恢复"和"不可恢复"
//! 3. **FAQ 外层重试**：数量关卡 → 去重 → 评分，质量不达标时重新生成
//! 4. **输出清理**：中止时删除本次运行已登记的输出文件
//!
//! 编排器不做具体的生成、校验或计算，只负责调度

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use crate::config::{Config, DocumentKind, OutputPaths};
use crate::error::{PipelineError, PipelineResult};
use crate::infrastructure::{Assembler, ContentGenerator};
use crate::models::{
    ComparisonDocument, ContentBlocks, FaqBatch, FaqDocument, ProductPageDocument, ProductRecord,
    Stage, FAQ_BATCH_SIZE,
};
use crate::orchestrator::cleanup::remove_outputs;
use crate::orchestrator::events::{EventSink, PipelineEvent, TracingEventSink};
use crate::orchestrator::state::PipelineState;
use crate::services::{QualityEnforcer, SchemaValidator, MIN_QUALITY_SCORE};
use crate::utils::logging::log_stage_start;
use crate::workflow::{
    BlockStage, ComparisonOutcome, ComparisonStage, ParserStage, QuestionStage, RetryPolicy,
};

/// FAQ 外层重试的决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    Abort(PipelineError),
}

/// 第 `attempt` 次（从 1 开始）尝试失败后是否再试
///
/// 只有可恢复错误且还有剩余次数时重试；次数耗尽时可恢复错误升级为不可恢复
pub fn decide_quality_retry(
    attempt: u32,
    max_attempts: u32,
    error: PipelineError,
) -> RetryDecision {
    match error {
        PipelineError::Recoverable(_) if attempt < max_attempts => RetryDecision::Retry,
        other => RetryDecision::Abort(other.escalate()),
    }
}

/// 一次成功运行的汇总
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outputs: OutputPaths,
    /// FAQ 生成用掉的外层尝试次数
    pub question_attempts: u32,
    pub average_quality_score: f64,
}

/// 通过质量检查的 FAQ
struct AcceptedFaqs {
    batch: FaqBatch,
    attempts: u32,
    average_score: f64,
}

pub struct PipelineOrchestrator {
    config: Config,
    assembler: Arc<dyn Assembler>,
    parser: ParserStage,
    questions: QuestionStage,
    blocks: BlockStage,
    comparison: ComparisonStage,
    validator: SchemaValidator,
    enforcer: QualityEnforcer,
    events: Arc<dyn EventSink>,
    state: PipelineState,
    tracked: Vec<PathBuf>,
}

impl PipelineOrchestrator {
    pub fn new(
        config: Config,
        generator: Arc<dyn ContentGenerator>,
        assembler: Arc<dyn Assembler>,
    ) -> Self {
        let policy = RetryPolicy::from_config(&config);
        Self {
            parser: ParserStage::new(generator.clone(), policy),
            questions: QuestionStage::new(generator.clone(), policy),
            blocks: BlockStage::new(generator.clone(), policy),
            comparison: ComparisonStage::new(generator, policy),
            config,
            assembler,
            validator: SchemaValidator::new(),
            enforcer: QualityEnforcer::new(),
            events: Arc::new(TracingEventSink),
            state: PipelineState::Init,
            tracked: Vec::new(),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// 本次运行登记过的输出文件
    pub fn tracked_outputs(&self) -> &[PathBuf] {
        &self.tracked
    }

    /// 处理一个产品
    ///
    /// 任何不可恢复错误都会让状态进入 `Aborted`，并删除已登记的输出文件
    pub async fn run(&mut self, input_path: &Path) -> PipelineResult<RunReport> {
        self.state = PipelineState::Init;
        self.tracked.clear();

        match self.execute(input_path).await {
            Ok(report) => Ok(report),
            Err(err) => {
                let err = err.escalate();
                self.abort(&err).await;
                Err(err)
            }
        }
    }

    async fn execute(&mut self, input_path: &Path) -> PipelineResult<RunReport> {
        self.config.validate()?;

        let raw_product = self.load_input(input_path).await?;
        self.transition(PipelineState::InputLoaded);

        log_stage_start(Stage::Parse);
        let product = self.parser.run(&raw_product).await?;
        self.transition(PipelineState::Parsed);

        log_stage_start(Stage::Questions);
        let faqs = self.generate_questions(&product).await?;
        self.transition(PipelineState::QuestionsGenerated);

        log_stage_start(Stage::Blocks);
        let blocks = self.blocks.run(&product).await?;
        self.transition(PipelineState::BlocksGenerated);

        log_stage_start(Stage::Comparison);
        let outcome = self.comparison.run(&product).await?;
        self.transition(PipelineState::ComparisonGenerated);

        log_stage_start(Stage::Assembly);
        let outputs = self.assemble(faqs.batch, &product, &blocks, outcome).await?;
        self.transition(PipelineState::Assembled);

        Ok(RunReport {
            outputs,
            question_attempts: faqs.attempts,
            average_quality_score: faqs.average_score,
        })
    }

    async fn load_input(&self, input_path: &Path) -> PipelineResult<JsonValue> {
        let content = tokio::fs::read_to_string(input_path).await.map_err(|e| {
            PipelineError::non_recoverable(format!(
                "无法读取输入文件 {}: {}",
                input_path.display(),
                e
            ))
        })?;

        let raw: JsonValue = serde_json::from_str(&content).map_err(|e| {
            PipelineError::non_recoverable(format!(
                "输入文件不是合法 JSON {}: {}",
                input_path.display(),
                e
            ))
        })?;

        info!("📄 已加载输入: {}", input_path.display());
        Ok(raw)
    }

    /// FAQ 外层重试循环
    async fn generate_questions(&self, product: &ProductRecord) -> PipelineResult<AcceptedFaqs> {
        let max_attempts = self.config.max_quality_attempts;
        let mut attempt = 1;

        loop {
            info!("🔁 FAQ 生成尝试 {}/{}", attempt, max_attempts);

            let err = match self.question_attempt(product).await {
                Ok((batch, average_score)) => {
                    return Ok(AcceptedFaqs {
                        batch,
                        attempts: attempt,
                        average_score,
                    });
                }
                Err(err) => err,
            };

            if err.is_recoverable() {
                self.events.emit(&PipelineEvent::QualityAttemptFailed {
                    attempt,
                    max_attempts,
                    reason: err.reason().to_string(),
                });
            }

            match decide_quality_retry(attempt, max_attempts, err) {
                RetryDecision::Retry => attempt += 1,
                RetryDecision::Abort(err) => return Err(err),
            }
        }
    }

    /// 一次外层尝试：生成 → 数量关卡 → 去重 → 评分
    async fn question_attempt(&self, product: &ProductRecord) -> PipelineResult<(FaqBatch, f64)> {
        let questions = self.questions.run(product).await?;

        // 数量不对直接不可恢复，不走外层重试
        let batch = self.validator.validate_faq_batch(questions)?;

        let unique = self.enforcer.deduplicate_questions(batch.into_inner());
        if unique.len() < FAQ_BATCH_SIZE {
            return Err(PipelineError::recoverable(format!(
                "去重后只剩 {} 个问题，需要 {} 个",
                unique.len(),
                FAQ_BATCH_SIZE
            )));
        }

        let mut batch = self.validator.validate_faq_batch(unique)?;
        let average_score = self.enforcer.score_questions(&mut batch);

        let low_quality = self.enforcer.low_quality_questions(&batch).len();
        if low_quality > 0 {
            return Err(PipelineError::recoverable(format!(
                "{} 个问题低于 {} 分",
                low_quality, MIN_QUALITY_SCORE
            )));
        }

        Ok((batch, average_score))
    }

    /// 登记输出路径后依次写出三份文档
    async fn assemble(
        &mut self,
        faqs: FaqBatch,
        product: &ProductRecord,
        blocks: &ContentBlocks,
        outcome: ComparisonOutcome,
    ) -> PipelineResult<OutputPaths> {
        let paths = self.config.output_paths();
        self.tracked = paths.iter().map(Path::to_path_buf).collect();

        let faq_document = FaqDocument { faqs };
        let product_document = ProductPageDocument::from_parts(product, blocks);
        let comparison_document = ComparisonDocument {
            product_a: product.clone(),
            product_b: outcome.product_b,
            comparison: outcome.comparison,
            analysis: outcome.analysis,
        };

        let faq_path = self
            .assembler
            .assemble_faq(
                &faq_document,
                &self.config.template_path(DocumentKind::Faq),
                paths.get(DocumentKind::Faq),
            )
            .await
            .map_err(assembly_error)?;

        let product_path = self
            .assembler
            .assemble_product(
                &product_document,
                &self.config.template_path(DocumentKind::Product),
                paths.get(DocumentKind::Product),
            )
            .await
            .map_err(assembly_error)?;

        let comparison_path = self
            .assembler
            .assemble_comparison(
                &comparison_document,
                &self.config.template_path(DocumentKind::Comparison),
                paths.get(DocumentKind::Comparison),
            )
            .await
            .map_err(assembly_error)?;

        Ok(OutputPaths {
            faq: faq_path,
            product: product_path,
            comparison: comparison_path,
        })
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state.is_terminal() {
            warn!("⚠️ 已处于终态 {}，忽略迁移到 {}", self.state, next);
            return;
        }

        let previous = std::mem::replace(&mut self.state, next.clone());
        self.events.emit(&PipelineEvent::StateChanged {
            from: previous,
            to: next,
        });
    }

    async fn abort(&mut self, err: &PipelineError) {
        error!("❌ 中止于 {}: {}", self.state, err);
        self.events.emit(&PipelineEvent::Aborted {
            reason: err.reason().to_string(),
        });
        self.transition(PipelineState::Aborted(err.reason().to_string()));

        let removed = remove_outputs(&self.tracked, self.events.as_ref()).await;
        if removed > 0 {
            info!("🗑️ 已清理 {} 个输出文件", removed);
        }
    }
}

fn assembly_error(err: anyhow::Error) -> PipelineError {
    PipelineError::non_recoverable(format!("文档组装失败: {:#}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{FileAssembler, GenerationRequest};
    use crate::orchestrator::events::RecordingEventSink;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl ContentGenerator for Unreachable {
        async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<String> {
            anyhow::bail!("不应调用生成服务")
        }
    }

    fn orchestrator(sink: &Arc<RecordingEventSink>) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            Config::default(),
            Arc::new(Unreachable),
            Arc::new(FileAssembler::new()),
        )
        .with_event_sink(sink.clone())
    }

    #[test]
    fn test_terminal_state_is_never_left() {
        let sink = Arc::new(RecordingEventSink::new());
        let mut orchestrator = orchestrator(&sink);

        orchestrator.transition(PipelineState::InputLoaded);
        orchestrator.transition(PipelineState::Aborted("输入缺失".to_string()));
        orchestrator.transition(PipelineState::Parsed);
        orchestrator.transition(PipelineState::Aborted("再次中止".to_string()));

        assert_eq!(
            orchestrator.state(),
            &PipelineState::Aborted("输入缺失".to_string())
        );
        assert_eq!(
            sink.states(),
            vec![
                PipelineState::InputLoaded,
                PipelineState::Aborted("输入缺失".to_string()),
            ]
        );
    }

    #[test]
    fn test_recoverable_error_retries_until_budget_is_spent() {
        let err = PipelineError::recoverable("去重后只剩 14 个问题");
        assert_eq!(decide_quality_retry(1, 3, err.clone()), RetryDecision::Retry);
        assert_eq!(decide_quality_retry(2, 3, err.clone()), RetryDecision::Retry);
        assert_eq!(
            decide_quality_retry(3, 3, err),
            RetryDecision::Abort(PipelineError::non_recoverable("去重后只剩 14 个问题"))
        );
    }

    #[test]
    fn test_non_recoverable_error_aborts_immediately() {
        let err = PipelineError::non_recoverable("数量不是 15");
        assert_eq!(
            decide_quality_retry(1, 3, err.clone()),
            RetryDecision::Abort(err)
        );
    }

    #[test]
    fn test_single_attempt_budget() {
        let err = PipelineError::recoverable("低分");
        assert!(matches!(
            decide_quality_retry(1, 1, err),
            RetryDecision::Abort(PipelineError::NonRecoverable(_))
        ));
    }
}
