use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// 输出文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Faq,
    Product,
    Comparison,
}

impl DocumentKind {
    /// 模板文件名
    pub fn template_file(self) -> &'static str {
        match self {
            DocumentKind::Faq => "faq_template.json",
            DocumentKind::Product => "product_template.json",
            DocumentKind::Comparison => "comparison_template.json",
        }
    }

    /// 输出文件名
    pub fn output_file(self) -> &'static str {
        match self {
            DocumentKind::Faq => "faq.json",
            DocumentKind::Product => "product_page.json",
            DocumentKind::Comparison => "comparison_page.json",
        }
    }
}

/// 一次运行的三个输出文件路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub faq: PathBuf,
    pub product: PathBuf,
    pub comparison: PathBuf,
}

impl OutputPaths {
    pub fn get(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Faq => &self.faq,
            DocumentKind::Product => &self.product,
            DocumentKind::Comparison => &self.comparison,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [
            self.faq.as_path(),
            self.product.as_path(),
            self.comparison.as_path(),
        ]
        .into_iter()
    }
}

/// 程序配置
///
/// 启动时构建一次，之后以不可变值传给编排器和各协作方
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    // --- 重试配置 ---
    /// 单个阶段内部的最大尝试次数
    pub max_retries: u32,
    /// 阶段内部两次尝试之间的固定等待（毫秒）
    pub retry_delay_ms: u64,
    /// 编排器对问题生成阶段的最大外层尝试次数
    pub max_quality_attempts: u32,
    // --- 路径配置 ---
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub templates_dir: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            max_retries: 3,
            retry_delay_ms: 2000,
            max_quality_attempts: 3,
            input_file: PathBuf::from("data/input_product.json"),
            output_dir: PathBuf::from("generated_output"),
            templates_dir: PathBuf::from("templates"),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME")
                .or_else(|_| std::env::var("MODEL_NAME"))
                .unwrap_or(default.llm_model_name),
            temperature: env_parse("TEMPERATURE", default.temperature),
            max_tokens: env_parse("MAX_TOKENS", default.max_tokens),
            max_retries: env_parse("MAX_RETRIES", default.max_retries),
            retry_delay_ms: env_parse("RETRY_DELAY_MS", default.retry_delay_ms),
            max_quality_attempts: env_parse("MAX_QUALITY_ATTEMPTS", default.max_quality_attempts),
            input_file: std::env::var("INPUT_FILE").map(PathBuf::from).unwrap_or(default.input_file),
            output_dir: std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(default.output_dir),
            templates_dir: std::env::var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.templates_dir),
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，未出现的字段取默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_retries",
                reason: "至少需要 1 次尝试".to_string(),
            });
        }
        if self.max_quality_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_quality_attempts",
                reason: "至少需要 1 次尝试".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "temperature",
                reason: format!("{} 不在 [0, 2] 范围内", self.temperature),
            });
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn template_path(&self, kind: DocumentKind) -> PathBuf {
        self.templates_dir.join(kind.template_file())
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            faq: self.output_dir.join(DocumentKind::Faq.output_file()),
            product: self.output_dir.join(DocumentKind::Product.output_file()),
            comparison: self.output_dir.join(DocumentKind::Comparison.output_file()),
        }
    }
}

/// 读取并解析环境变量，解析失败时保留默认值
fn env_parse<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(
                "环境变量 {} 解析失败: 值 '{}' 无效，使用默认值 {}",
                var_name, value, default
            );
            default
        }),
        Err(_) => default,
    }
}
