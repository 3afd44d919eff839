//! 错误类型
//!
//! 分为两层：
//! - 阶段内部错误（`ValidationError` / `FormatError` / `PayloadError` / `StageError`），
//!   由各阶段适配器在本地重试范围内处理
//! - 编排层错误（`PipelineError`），只有"可恢复"和"不可恢复"两种，
//!   编排器的重试 / 中止决策只看这两个变体

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 结构校验规则
///
/// 每条规则对应一个硬性关卡，失败时随 `ValidationError` 一起返回
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    /// 数据形状不符（不是对象、缺字段、类型不对）
    Shape,
    NameNonEmpty,
    PricePositive,
    SkinTypeNonEmpty,
    IngredientsNonEmpty,
    BenefitsNonEmpty,
    CategoryKnown,
    QualityScoreRange,
    FaqCount,
    CurrencyFixed,
}

impl ValidationRule {
    /// 规则名称（稳定的 snake_case 字符串）
    pub fn name(self) -> &'static str {
        match self {
            ValidationRule::Shape => "shape",
            ValidationRule::NameNonEmpty => "name_non_empty",
            ValidationRule::PricePositive => "price_positive",
            ValidationRule::SkinTypeNonEmpty => "skin_type_non_empty",
            ValidationRule::IngredientsNonEmpty => "ingredients_non_empty",
            ValidationRule::BenefitsNonEmpty => "benefits_non_empty",
            ValidationRule::CategoryKnown => "category_known",
            ValidationRule::QualityScoreRange => "quality_score_range",
            ValidationRule::FaqCount => "faq_count",
            ValidationRule::CurrencyFixed => "currency_fixed",
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 结构校验失败
///
/// 携带被违反的规则和出问题的值，从不静默修正数据
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("校验失败 [{rule}]: {value}")]
pub struct ValidationError {
    pub rule: ValidationRule,
    pub value: String,
}

impl ValidationError {
    pub fn new(rule: ValidationRule, value: impl Into<String>) -> Self {
        Self {
            rule,
            value: value.into(),
        }
    }

    /// 形状错误的快捷构造
    pub fn shape(value: impl Into<String>) -> Self {
        Self::new(ValidationRule::Shape, value)
    }
}

/// 确定性计算的输入格式错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("无法从 '{0}' 中提取数字")]
    NoDigits(String),

    #[error("价格必须是整数或文本，实际类型: {0}")]
    UnsupportedType(String),

    #[error("数值超出范围: {0}")]
    OutOfRange(String),
}

/// 从生成文本中提取结构化数据失败
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("生成结果为空")]
    Empty,

    #[error("无法解析结构化数据: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// 阶段适配器的本地错误
///
/// 任何变体都会触发本地有限次重试，重试耗尽后原样抛给编排器
#[derive(Debug, Error)]
pub enum StageError {
    #[error("生成服务调用失败: {0}")]
    Generation(String),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("输出质量不达标: {0}")]
    LowQuality(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("未配置 LLM API 密钥 (LLM_API_KEY / GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("配置项 {field} 无效: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("读取配置文件失败 ({path:?}): {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML解析失败 ({path:?}): {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 编排层错误
///
/// - `Recoverable`：当前阶段的输出没通过质量 / 数量检查，可以重新跑这个阶段
/// - `NonRecoverable`：配置、输入、重试耗尽、结构校验失败，整次运行中止
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("可恢复错误: {0}")]
    Recoverable(String),

    #[error("不可恢复错误: {0}")]
    NonRecoverable(String),
}

impl PipelineError {
    pub fn recoverable(reason: impl Into<String>) -> Self {
        PipelineError::Recoverable(reason.into())
    }

    pub fn non_recoverable(reason: impl Into<String>) -> Self {
        PipelineError::NonRecoverable(reason.into())
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::Recoverable(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            PipelineError::Recoverable(reason) | PipelineError::NonRecoverable(reason) => reason,
        }
    }

    /// 升级为不可恢复错误（保留原因）
    pub fn escalate(self) -> Self {
        match self {
            PipelineError::Recoverable(reason) => PipelineError::NonRecoverable(reason),
            other => other,
        }
    }
}

// ========== 从下层错误转换 ==========
// 到达编排边界的下层错误一律视为不可恢复：它们要么已经在阶段内重试耗尽，
// 要么是结构 / 配置问题

impl From<StageError> for PipelineError {
    fn from(err: StageError) -> Self {
        PipelineError::NonRecoverable(err.to_string())
    }
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        PipelineError::NonRecoverable(err.to_string())
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::NonRecoverable(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 编排层结果类型
pub type PipelineResult<T> = Result<T, PipelineError>;
