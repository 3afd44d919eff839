//! 两个产品的对比结果
//!
//! 全部字段由确定性计算得出，从不直接采用生成服务给出的数字

use std::fmt;

use serde::{Deserialize, Serialize};

/// 对比结论
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// 浓度更高的产品名；空字符串表示不分胜负
    pub stronger_formulation: String,
    /// A 的价格减 B 的价格，可为负数或零
    pub price_difference: i64,
    /// 更适合油性肌肤的产品名，或字面量 "Neither"
    pub better_for_oily_skin: String,
}

/// 浓度比较结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcentrationWinner {
    AStronger,
    BStronger,
    Equal,
}

/// 价格区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceRange {
    Budget,
    #[serde(rename = "Mid-range")]
    MidRange,
    Premium,
    Luxury,
}

impl PriceRange {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceRange::Budget => "Budget",
            PriceRange::MidRange => "Mid-range",
            PriceRange::Premium => "Premium",
            PriceRange::Luxury => "Luxury",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 成分重合情况（均为小写、去空白后的名称，按字典序排列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientOverlap {
    pub common: Vec<String>,
    pub unique_to_a: Vec<String>,
    pub unique_to_b: Vec<String>,
    /// |common| / |set(A)| × 100，A 为空时为 0
    pub overlap_percentage: f64,
}

/// 对比页附带的分析数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonAnalysis {
    pub price_range_a: PriceRange,
    pub price_range_b: PriceRange,
    pub ingredient_overlap: IngredientOverlap,
}
