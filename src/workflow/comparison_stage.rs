//! 对比生成阶段 - 流程层
//!
//! 生成服务只负责虚构竞品 B；对比结论全部由确定性计算重新得出，
//! 生成结果里附带的任何对比数字都会被丢弃。
//! 区分度不足的对比会换一个竞品重试；重试用完后接受最后一次结构合法的结果

use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::error::{StageError, ValidationError};
use crate::infrastructure::ContentGenerator;
use crate::models::{ComparisonAnalysis, ComparisonResult, ProductRecord, Stage};
use crate::services::calculators::{analyze_products, compare_products};
use crate::services::{QualityEnforcer, SchemaValidator};
use crate::workflow::generation::fetch_payload;
use crate::workflow::parser_stage::into_product;
use crate::workflow::prompts;
use crate::workflow::retry::{with_retry, RetryPolicy};

/// 对比阶段的产出
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonOutcome {
    pub product_b: ProductRecord,
    pub comparison: ComparisonResult,
    pub analysis: ComparisonAnalysis,
}

pub struct ComparisonStage {
    generator: Arc<dyn ContentGenerator>,
    validator: SchemaValidator,
    enforcer: QualityEnforcer,
    policy: RetryPolicy,
}

impl ComparisonStage {
    pub fn new(generator: Arc<dyn ContentGenerator>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            validator: SchemaValidator::new(),
            enforcer: QualityEnforcer::new(),
            policy,
        }
    }

    pub async fn run(&self, product_a: &ProductRecord) -> Result<ComparisonOutcome, StageError> {
        // 最近一次结构合法、但区分度不足的对比
        let weakest_slot: Mutex<Option<ComparisonOutcome>> = Mutex::new(None);
        let weakest = &weakest_slot;

        let result = with_retry(Stage::Comparison, self.policy, move |attempt| async move {
            let request = prompts::comparison_request(product_a);
            let payload = fetch_payload(self.generator.as_ref(), &request, attempt).await?;
            let product_b = into_product(&self.validator, competitor_of(payload)?)?;

            let outcome = ComparisonOutcome {
                comparison: compare_products(product_a, &product_b),
                analysis: analyze_products(product_a, &product_b),
                product_b,
            };

            if self.enforcer.detect_low_quality_comparison(&outcome.comparison) {
                let reason = format!("与 {} 的对比无法区分", outcome.product_b.name());
                if let Ok(mut slot) = weakest.lock() {
                    *slot = Some(outcome);
                }
                return Err(StageError::LowQuality(reason));
            }

            Ok(outcome)
        })
        .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => match weakest_slot.into_inner().ok().flatten() {
                // 不分胜负、价差为 0 都是合法结论
                Some(outcome) => {
                    warn!("⚠️ 重试已用完（{}），采用最后一次结构合法的对比结果", err);
                    outcome
                }
                None => return Err(err),
            },
        };

        info!(
            "✓ 对比生成完成: {} vs {}，价差 {}",
            product_a.name(),
            outcome.product_b.name(),
            outcome.comparison.price_difference
        );
        Ok(outcome)
    }
}

/// 取出 `product_b`，其余字段忽略
fn competitor_of(payload: JsonValue) -> Result<JsonValue, ValidationError> {
    let JsonValue::Object(mut map) = payload else {
        return Err(ValidationError::shape("对比结果应为对象"));
    };

    if map.contains_key("comparison") {
        warn!("忽略生成服务给出的 comparison 字段，改为确定性计算");
    }

    map.remove("product_b")
        .ok_or_else(|| ValidationError::shape("缺少 product_b"))
}
