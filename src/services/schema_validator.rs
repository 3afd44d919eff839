//! 结构校验 - 业务能力层
//!
//! 所有进出流水线的记录都要过这里的硬性关卡：
//! - 产品：价格 > 0，名称、肤质、成分、功效非空
//! - 问题：类别必须属于固定枚举
//! - FAQ 批次：恰好 15 条
//! - 价格块：币种固定为 INR
//!
//! 先解析成无类型的 JSON，再经由草稿类型构造强类型记录。
//! 记录类型自身的 `TryFrom` / serde 反序列化也调用同一组 `check_*` 函数，
//! 所以不存在绕过关卡的构造路径。

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::{ValidationError, ValidationRule};
use crate::models::{
    ComparisonAnalysis, ComparisonDocument, ComparisonResult, ContentBlocks, ContentBlocksDraft,
    FaqBatch, FaqDocument, PriceBlock, PriceBlockDraft, ProductDraft, ProductPageDocument,
    ProductRecord, QuestionCategory, QuestionDraft, QuestionRecord, FAQ_BATCH_SIZE,
};

// ========== 记录级关卡 ==========

pub(crate) fn check_product(draft: &ProductDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationRule::NameNonEmpty,
            format!("{:?}", draft.name),
        ));
    }
    if draft.price <= 0 {
        return Err(ValidationError::new(
            ValidationRule::PricePositive,
            draft.price.to_string(),
        ));
    }
    if draft.skin_type.is_empty() {
        return Err(ValidationError::new(ValidationRule::SkinTypeNonEmpty, "[]"));
    }
    if draft.ingredients.is_empty() {
        return Err(ValidationError::new(
            ValidationRule::IngredientsNonEmpty,
            "[]",
        ));
    }
    if draft.benefits.is_empty() {
        return Err(ValidationError::new(ValidationRule::BenefitsNonEmpty, "[]"));
    }
    Ok(())
}

pub(crate) fn check_category(category: &str) -> Result<QuestionCategory, ValidationError> {
    QuestionCategory::from_name(category)
        .ok_or_else(|| ValidationError::new(ValidationRule::CategoryKnown, category))
}

pub(crate) fn check_quality_score(score: Option<i64>) -> Result<Option<u8>, ValidationError> {
    match score {
        None => Ok(None),
        Some(value) if (0..=100).contains(&value) => Ok(Some(value as u8)),
        Some(value) => Err(ValidationError::new(
            ValidationRule::QualityScoreRange,
            value.to_string(),
        )),
    }
}

pub(crate) fn check_faq_count(count: usize) -> Result<(), ValidationError> {
    if count != FAQ_BATCH_SIZE {
        return Err(ValidationError::new(
            ValidationRule::FaqCount,
            count.to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_price_block(draft: &PriceBlockDraft) -> Result<(), ValidationError> {
    if let Some(currency) = &draft.currency {
        if currency != crate::models::Currency::CODE {
            return Err(ValidationError::new(
                ValidationRule::CurrencyFixed,
                currency.as_str(),
            ));
        }
    }
    if draft.price <= 0 {
        return Err(ValidationError::new(
            ValidationRule::PricePositive,
            draft.price.to_string(),
        ));
    }
    Ok(())
}

// ========== 从无类型数据构造记录 ==========

/// 结构校验器
///
/// 无状态，每个方法都是纯函数：`validate(raw) -> Record | ValidationError`
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_product(&self, raw: &JsonValue) -> Result<ProductRecord, ValidationError> {
        let draft: ProductDraft = parse_object(raw, "product")?;
        ProductRecord::try_from(draft)
    }

    /// 校验生成服务给出的单条问题
    ///
    /// 分数只能由质量检查器写入，生成结果里自带的 `quality_score` 一律丢弃
    pub fn validate_question(&self, raw: &JsonValue) -> Result<QuestionRecord, ValidationError> {
        let mut draft: QuestionDraft = parse_object(raw, "question")?;
        if let Some(score) = draft.quality_score.take() {
            warn!("忽略生成服务给出的 quality_score: {}", score);
        }
        QuestionRecord::try_from(draft)
    }

    /// 校验一组问题（JSON 数组），逐条校验类别，不检查数量
    pub fn validate_questions(
        &self,
        raw: &JsonValue,
    ) -> Result<Vec<QuestionRecord>, ValidationError> {
        question_array(raw)?
            .iter()
            .map(|item| self.validate_question(item))
            .collect()
    }

    /// 已打分的问题（最终文档复查用），保留并校验 `quality_score`
    fn validate_scored_questions(
        &self,
        raw: &JsonValue,
    ) -> Result<Vec<QuestionRecord>, ValidationError> {
        question_array(raw)?
            .iter()
            .map(|item| QuestionRecord::try_from(parse_object::<QuestionDraft>(item, "question")?))
            .collect()
    }

    /// FAQ 批次数量关卡
    pub fn validate_faq_batch(
        &self,
        questions: Vec<QuestionRecord>,
    ) -> Result<FaqBatch, ValidationError> {
        FaqBatch::try_from(questions)
    }

    pub fn validate_content_blocks(
        &self,
        raw: &JsonValue,
    ) -> Result<ContentBlocks, ValidationError> {
        let draft: ContentBlocksDraft = parse_object(raw, "content_blocks")?;
        ContentBlocks::try_from(draft)
    }

    pub fn validate_comparison(
        &self,
        raw: &JsonValue,
    ) -> Result<ComparisonResult, ValidationError> {
        parse_object(raw, "comparison")
    }

    // ========== 最终文档 ==========

    pub fn validate_faq_document(&self, raw: &JsonValue) -> Result<FaqDocument, ValidationError> {
        #[derive(Deserialize)]
        struct Draft {
            faqs: JsonValue,
        }

        let draft: Draft = parse_object(raw, "faq_document")?;
        let questions = self.validate_scored_questions(&draft.faqs)?;
        let faqs = self.validate_faq_batch(questions)?;
        Ok(FaqDocument { faqs })
    }

    pub fn validate_product_page(
        &self,
        raw: &JsonValue,
    ) -> Result<ProductPageDocument, ValidationError> {
        #[derive(Deserialize)]
        struct Draft {
            name: String,
            highlights: Vec<String>,
            usage_block: String,
            ingredient_block: Vec<String>,
            pricing: PriceBlockDraft,
        }

        let draft: Draft = parse_object(raw, "product_page")?;
        if draft.name.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationRule::NameNonEmpty,
                format!("{:?}", draft.name),
            ));
        }
        Ok(ProductPageDocument {
            name: draft.name,
            highlights: draft.highlights,
            usage_block: draft.usage_block,
            ingredient_block: draft.ingredient_block,
            pricing: PriceBlock::try_from(draft.pricing)?,
        })
    }

    pub fn validate_comparison_document(
        &self,
        raw: &JsonValue,
    ) -> Result<ComparisonDocument, ValidationError> {
        #[derive(Deserialize)]
        struct Draft {
            product_a: JsonValue,
            product_b: JsonValue,
            comparison: JsonValue,
            analysis: JsonValue,
        }

        let draft: Draft = parse_object(raw, "comparison_document")?;
        let analysis: ComparisonAnalysis = parse_object(&draft.analysis, "analysis")?;
        Ok(ComparisonDocument {
            product_a: self.validate_product(&draft.product_a)?,
            product_b: self.validate_product(&draft.product_b)?,
            comparison: self.validate_comparison(&draft.comparison)?,
            analysis,
        })
    }
}

fn question_array(raw: &JsonValue) -> Result<&Vec<JsonValue>, ValidationError> {
    raw.as_array()
        .ok_or_else(|| ValidationError::shape(format!("questions 应为数组: {}", kind_of(raw))))
}

/// 要求输入是 JSON 对象并能反序列化为草稿类型，否则返回形状错误
fn parse_object<T: DeserializeOwned>(raw: &JsonValue, what: &str) -> Result<T, ValidationError> {
    if !raw.is_object() {
        return Err(ValidationError::shape(format!(
            "{} 应为对象: {}",
            what,
            kind_of(raw)
        )));
    }
    T::deserialize(raw).map_err(|e| ValidationError::shape(format!("{}: {}", what, e)))
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
