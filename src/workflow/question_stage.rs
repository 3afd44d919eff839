//! FAQ 生成阶段 - 流程层
//!
//! 只负责拿到一组结构合法的问题；数量、去重和评分由编排器处理

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::info;

use crate::error::{StageError, ValidationError};
use crate::infrastructure::ContentGenerator;
use crate::models::{ProductRecord, QuestionRecord, Stage};
use crate::services::SchemaValidator;
use crate::workflow::generation::fetch_payload;
use crate::workflow::prompts;
use crate::workflow::retry::{with_retry, RetryPolicy};

pub struct QuestionStage {
    generator: Arc<dyn ContentGenerator>,
    validator: SchemaValidator,
    policy: RetryPolicy,
}

impl QuestionStage {
    pub fn new(generator: Arc<dyn ContentGenerator>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            validator: SchemaValidator::new(),
            policy,
        }
    }

    pub async fn run(&self, product: &ProductRecord) -> Result<Vec<QuestionRecord>, StageError> {
        let questions = with_retry(Stage::Questions, self.policy, move |attempt| async move {
            let request = prompts::question_request(product);
            let payload = fetch_payload(self.generator.as_ref(), &request, attempt).await?;
            let items = question_items(payload)?;
            self.validator
                .validate_questions(&items)
                .map_err(StageError::from)
        })
        .await?;

        info!("✓ 收到 {} 个问题", questions.len());
        Ok(questions)
    }
}

/// 接受顶层数组，或带 `faqs` / `questions` 数组的对象
fn question_items(payload: JsonValue) -> Result<JsonValue, ValidationError> {
    match payload {
        JsonValue::Array(_) => Ok(payload),
        JsonValue::Object(mut map) => map
            .remove("faqs")
            .or_else(|| map.remove("questions"))
            .filter(JsonValue::is_array)
            .ok_or_else(|| ValidationError::shape("对象中缺少 faqs / questions 数组")),
        other => Err(ValidationError::shape(format!("问题列表应为数组: {}", other))),
    }
}
