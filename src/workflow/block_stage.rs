//! 内容块生成阶段 - 流程层

use std::sync::Arc;

use tracing::info;

use crate::error::StageError;
use crate::infrastructure::ContentGenerator;
use crate::models::{ContentBlocks, ProductRecord, Stage};
use crate::services::{QualityEnforcer, SchemaValidator};
use crate::workflow::generation::fetch_payload;
use crate::workflow::prompts;
use crate::workflow::retry::{with_retry, RetryPolicy};

pub struct BlockStage {
    generator: Arc<dyn ContentGenerator>,
    validator: SchemaValidator,
    enforcer: QualityEnforcer,
    policy: RetryPolicy,
}

impl BlockStage {
    pub fn new(generator: Arc<dyn ContentGenerator>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            validator: SchemaValidator::new(),
            enforcer: QualityEnforcer::new(),
            policy,
        }
    }

    /// 结构校验 + 充分性检查，任一不过都在本地重试
    pub async fn run(&self, product: &ProductRecord) -> Result<ContentBlocks, StageError> {
        let blocks = with_retry(Stage::Blocks, self.policy, move |attempt| async move {
            let request = prompts::block_request(product);
            let payload = fetch_payload(self.generator.as_ref(), &request, attempt).await?;
            let blocks = self.validator.validate_content_blocks(&payload)?;

            if !self.enforcer.validate_block_quality(&blocks) {
                return Err(StageError::LowQuality("内容块不充分".to_string()));
            }
            Ok(blocks)
        })
        .await?;

        info!(
            "✓ 内容块生成完成: {} 条功效, {} 种成分",
            blocks.benefits().len(),
            blocks.ingredients_block().len()
        );
        Ok(blocks)
    }
}
