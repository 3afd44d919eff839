//! 三份最终输出文档
//!
//! 只写一次，由组装器持有；编排器不会再读回

use serde::{Deserialize, Serialize};

use crate::models::blocks::{ContentBlocks, PriceBlock};
use crate::models::comparison::{ComparisonAnalysis, ComparisonResult};
use crate::models::product::ProductRecord;
use crate::models::question::FaqBatch;

/// FAQ 文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqDocument {
    pub faqs: FaqBatch,
}

/// 产品页文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPageDocument {
    pub name: String,
    pub highlights: Vec<String>,
    pub usage_block: String,
    pub ingredient_block: Vec<String>,
    pub pricing: PriceBlock,
}

impl ProductPageDocument {
    pub fn from_parts(product: &ProductRecord, blocks: &ContentBlocks) -> Self {
        Self {
            name: product.name().to_string(),
            highlights: blocks.benefits().to_vec(),
            usage_block: blocks.usage_block().to_string(),
            ingredient_block: blocks.ingredients_block().to_vec(),
            pricing: *blocks.price_block(),
        }
    }
}

/// 对比页文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDocument {
    pub product_a: ProductRecord,
    pub product_b: ProductRecord,
    pub comparison: ComparisonResult,
    pub analysis: ComparisonAnalysis,
}
