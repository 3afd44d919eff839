//! 产品记录

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::services::schema_validator;

/// 未经校验的产品数据（直接来自生成结果或文件）
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub concentration: String,
    pub skin_type: Vec<String>,
    pub ingredients: Vec<String>,
    pub benefits: Vec<String>,
    pub usage: String,
    pub side_effects: String,
    pub price: i64,
}

/// 规范化的产品记录
///
/// 只能经由 `TryFrom<ProductDraft>`（或其 serde 反序列化）构造，
/// 因此每个实例都满足：名称非空、价格 > 0、三个列表字段非空。
/// 构造后在一次运行内不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductDraft")]
pub struct ProductRecord {
    name: String,
    concentration: String,
    skin_type: Vec<String>,
    ingredients: Vec<String>,
    benefits: Vec<String>,
    usage: String,
    side_effects: String,
    price: i64,
}

impl TryFrom<ProductDraft> for ProductRecord {
    type Error = ValidationError;

    fn try_from(draft: ProductDraft) -> Result<Self, Self::Error> {
        schema_validator::check_product(&draft)?;
        Ok(Self {
            name: draft.name,
            concentration: draft.concentration,
            skin_type: draft.skin_type,
            ingredients: draft.ingredients,
            benefits: draft.benefits,
            usage: draft.usage,
            side_effects: draft.side_effects,
            price: draft.price,
        })
    }
}

impl ProductRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn concentration(&self) -> &str {
        &self.concentration
    }

    pub fn skin_type(&self) -> &[String] {
        &self.skin_type
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn benefits(&self) -> &[String] {
        &self.benefits
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn side_effects(&self) -> &str {
        &self.side_effects
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    /// 是否适用于某种肤质（忽略大小写和首尾空白）
    pub fn supports_skin_type(&self, skin_type: &str) -> bool {
        let wanted = skin_type.trim();
        self.skin_type
            .iter()
            .any(|tag| tag.trim().eq_ignore_ascii_case(wanted))
    }
}
