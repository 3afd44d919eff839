//! 产品页内容块

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::services::schema_validator;

/// 币种，固定为 INR，不受生成结果控制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "INR")]
    Inr,
}

impl Currency {
    pub const CODE: &'static str = "INR";

    pub fn as_str(self) -> &'static str {
        Self::CODE
    }
}

/// 未经校验的价格块
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceBlockDraft {
    pub price: i64,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PriceBlockDraft")]
pub struct PriceBlock {
    price: i64,
    currency: Currency,
}

impl TryFrom<PriceBlockDraft> for PriceBlock {
    type Error = ValidationError;

    fn try_from(draft: PriceBlockDraft) -> Result<Self, Self::Error> {
        schema_validator::check_price_block(&draft)?;
        Ok(Self {
            price: draft.price,
            currency: Currency::Inr,
        })
    }
}

impl PriceBlock {
    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }
}

/// 未经校验的内容块
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentBlocksDraft {
    pub benefits: Vec<String>,
    pub usage_block: String,
    pub ingredients_block: Vec<String>,
    pub price_block: PriceBlockDraft,
}

/// 每次运行由内容块阶段生成一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContentBlocksDraft")]
pub struct ContentBlocks {
    benefits: Vec<String>,
    usage_block: String,
    ingredients_block: Vec<String>,
    price_block: PriceBlock,
}

impl TryFrom<ContentBlocksDraft> for ContentBlocks {
    type Error = ValidationError;

    fn try_from(draft: ContentBlocksDraft) -> Result<Self, Self::Error> {
        let price_block = PriceBlock::try_from(draft.price_block)?;
        Ok(Self {
            benefits: draft.benefits,
            usage_block: draft.usage_block,
            ingredients_block: draft.ingredients_block,
            price_block,
        })
    }
}

impl ContentBlocks {
    pub fn benefits(&self) -> &[String] {
        &self.benefits
    }

    pub fn usage_block(&self) -> &str {
        &self.usage_block
    }

    pub fn ingredients_block(&self) -> &[String] {
        &self.ingredients_block
    }

    pub fn price_block(&self) -> &PriceBlock {
        &self.price_block
    }
}
