//! 产品解析阶段 - 流程层
//!
//! 原始输入 → 生成服务清洗 → 价格归一化 → 结构校验 → `ProductRecord`

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::info;

use crate::error::StageError;
use crate::infrastructure::ContentGenerator;
use crate::models::{ProductRecord, Stage};
use crate::services::calculators::normalize_price;
use crate::services::SchemaValidator;
use crate::workflow::generation::fetch_payload;
use crate::workflow::prompts;
use crate::workflow::retry::{with_retry, RetryPolicy};

pub struct ParserStage {
    generator: Arc<dyn ContentGenerator>,
    validator: SchemaValidator,
    policy: RetryPolicy,
}

impl ParserStage {
    pub fn new(generator: Arc<dyn ContentGenerator>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            validator: SchemaValidator::new(),
            policy,
        }
    }

    pub async fn run(&self, raw_product: &JsonValue) -> Result<ProductRecord, StageError> {
        let product = with_retry(Stage::Parse, self.policy, move |attempt| async move {
            let request = prompts::parser_request(raw_product);
            let payload = fetch_payload(self.generator.as_ref(), &request, attempt).await?;
            into_product(&self.validator, payload)
        })
        .await?;

        info!("✓ 产品解析完成: {} (₹{})", product.name(), product.price());
        Ok(product)
    }
}

/// 归一化 `price` 字段后做产品结构校验
///
/// 比较阶段解析竞品时也走这里
pub(crate) fn into_product(
    validator: &SchemaValidator,
    mut payload: JsonValue,
) -> Result<ProductRecord, StageError> {
    if let Some(price) = payload.get_mut("price") {
        *price = JsonValue::from(normalize_price(price)?);
    }
    Ok(validator.validate_product(&payload)?)
}
