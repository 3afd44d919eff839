//! 确定性计算 - 业务能力层
//!
//! 纯函数，无 I/O。对比页上的所有数字都来自这里，而不是生成服务

use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use crate::error::FormatError;
use crate::models::{
    ComparisonAnalysis, ComparisonResult, ConcentrationWinner, IngredientOverlap, PriceRange,
    ProductRecord,
};

/// "两者都不适合"时的固定返回值
pub const NEITHER: &str = "Neither";

/// 对比页关注的肤质
pub const OILY_SKIN: &str = "Oily";

/// 去掉所有非数字字符
fn digits_of(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 提取浓度数值
///
/// 去掉所有非数字字符后按整数解析；没有数字时返回 0
pub fn extract_concentration_value(text: &str) -> f64 {
    let digits = digits_of(text);
    if digits.is_empty() {
        return 0.0;
    }
    digits.parse().unwrap_or(0.0)
}

pub fn compare_concentrations(a: &str, b: &str) -> ConcentrationWinner {
    let value_a = extract_concentration_value(a);
    let value_b = extract_concentration_value(b);

    if value_a > value_b {
        ConcentrationWinner::AStronger
    } else if value_b > value_a {
        ConcentrationWinner::BStronger
    } else {
        ConcentrationWinner::Equal
    }
}

/// A − B，有符号，不截断
pub fn price_difference(price_a: i64, price_b: i64) -> i64 {
    price_a - price_b
}

/// 判断哪个产品更适合某种肤质
///
/// 两者都适合时偏向 A；都不适合返回 "Neither"
pub fn better_for_skin_type(
    product_a: &ProductRecord,
    product_b: &ProductRecord,
    skin_type: &str,
) -> String {
    let a_suitable = product_a.supports_skin_type(skin_type);
    let b_suitable = product_b.supports_skin_type(skin_type);

    match (a_suitable, b_suitable) {
        (true, _) => product_a.name().to_string(),
        (false, true) => product_b.name().to_string(),
        (false, false) => NEITHER.to_string(),
    }
}

/// 价格归一化
///
/// 整数原样返回；文本提取其中的数字；其他类型返回 `FormatError`
pub fn normalize_price(value: &JsonValue) -> Result<i64, FormatError> {
    match value {
        JsonValue::Number(number) => number
            .as_i64()
            .ok_or_else(|| FormatError::UnsupportedType(format!("number({})", number))),
        JsonValue::String(text) => {
            let digits = digits_of(text);
            if digits.is_empty() {
                return Err(FormatError::NoDigits(text.clone()));
            }
            digits
                .parse()
                .map_err(|_| FormatError::OutOfRange(text.clone()))
        }
        JsonValue::Null => Err(FormatError::UnsupportedType("null".to_string())),
        JsonValue::Bool(_) => Err(FormatError::UnsupportedType("bool".to_string())),
        JsonValue::Array(_) => Err(FormatError::UnsupportedType("array".to_string())),
        JsonValue::Object(_) => Err(FormatError::UnsupportedType("object".to_string())),
    }
}

/// 价格区间：<500 Budget，<1000 Mid-range，<2000 Premium，其余 Luxury
pub fn categorize_price_range(price: i64) -> PriceRange {
    if price < 500 {
        PriceRange::Budget
    } else if price < 1000 {
        PriceRange::MidRange
    } else if price < 2000 {
        PriceRange::Premium
    } else {
        PriceRange::Luxury
    }
}

/// 成分重合度（忽略大小写和首尾空白）
pub fn ingredient_overlap(list_a: &[String], list_b: &[String]) -> IngredientOverlap {
    let normalize = |list: &[String]| -> BTreeSet<String> {
        list.iter().map(|item| item.trim().to_lowercase()).collect()
    };
    let set_a = normalize(list_a);
    let set_b = normalize(list_b);

    let common: Vec<String> = set_a.intersection(&set_b).cloned().collect();
    let overlap_percentage = if set_a.is_empty() {
        0.0
    } else {
        common.len() as f64 / set_a.len() as f64 * 100.0
    };

    IngredientOverlap {
        unique_to_a: set_a.difference(&set_b).cloned().collect(),
        unique_to_b: set_b.difference(&set_a).cloned().collect(),
        common,
        overlap_percentage,
    }
}

/// 计算两个产品的对比结论
pub fn compare_products(product_a: &ProductRecord, product_b: &ProductRecord) -> ComparisonResult {
    let stronger_formulation =
        match compare_concentrations(product_a.concentration(), product_b.concentration()) {
            ConcentrationWinner::AStronger => product_a.name().to_string(),
            ConcentrationWinner::BStronger => product_b.name().to_string(),
            ConcentrationWinner::Equal => String::new(),
        };

    ComparisonResult {
        stronger_formulation,
        price_difference: price_difference(product_a.price(), product_b.price()),
        better_for_oily_skin: better_for_skin_type(product_a, product_b, OILY_SKIN),
    }
}

/// 对比页的补充分析
pub fn analyze_products(product_a: &ProductRecord, product_b: &ProductRecord) -> ComparisonAnalysis {
    ComparisonAnalysis {
        price_range_a: categorize_price_range(product_a.price()),
        price_range_b: categorize_price_range(product_b.price()),
        ingredient_overlap: ingredient_overlap(product_a.ingredients(), product_b.ingredients()),
    }
}
