//! FAQ 问题记录与 15 条一组的问题批次

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;
use crate::services::schema_validator;

/// 一组 FAQ 必须恰好包含的问题数量
pub const FAQ_BATCH_SIZE: usize = 15;

/// 问题类别（固定枚举）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Informational,
    Usage,
    Safety,
    Purchase,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 4] = [
        QuestionCategory::Informational,
        QuestionCategory::Usage,
        QuestionCategory::Safety,
        QuestionCategory::Purchase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionCategory::Informational => "informational",
            QuestionCategory::Usage => "usage",
            QuestionCategory::Safety => "safety",
            QuestionCategory::Purchase => "purchase",
        }
    }

    /// 精确匹配类别名，不做大小写或空白修正
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未经校验的问题数据
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    pub answer: String,
    pub category: String,
    #[serde(default)]
    pub quality_score: Option<i64>,
}

/// 单条 FAQ
///
/// `quality_score` 只由质量检查器写入，打分前为 `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft")]
pub struct QuestionRecord {
    question: String,
    answer: String,
    category: QuestionCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality_score: Option<u8>,
}

impl TryFrom<QuestionDraft> for QuestionRecord {
    type Error = ValidationError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        let category = schema_validator::check_category(&draft.category)?;
        let quality_score = schema_validator::check_quality_score(draft.quality_score)?;
        Ok(Self {
            question: draft.question,
            answer: draft.answer,
            category,
            quality_score,
        })
    }
}

impl QuestionRecord {
    /// 类别已是强类型，因此构造不会失败
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        category: QuestionCategory,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category,
            quality_score: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn category(&self) -> QuestionCategory {
        self.category
    }

    pub fn quality_score(&self) -> Option<u8> {
        self.quality_score
    }

    pub(crate) fn set_quality_score(&mut self, score: u8) {
        self.quality_score = Some(score.min(100));
    }
}

/// 恰好 15 条问题的批次
///
/// 整批接受或整批丢弃，长度在构造后不可改变
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<QuestionRecord>")]
pub struct FaqBatch(Vec<QuestionRecord>);

impl TryFrom<Vec<QuestionRecord>> for FaqBatch {
    type Error = ValidationError;

    fn try_from(questions: Vec<QuestionRecord>) -> Result<Self, Self::Error> {
        schema_validator::check_faq_count(questions.len())?;
        Ok(Self(questions))
    }
}

impl Serialize for FaqBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl FaqBatch {
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionRecord> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<QuestionRecord> {
        self.0
    }

    /// 可变切片：允许写入分数，但不能增删元素
    pub(crate) fn questions_mut(&mut self) -> &mut [QuestionRecord] {
        &mut self.0
    }
}
