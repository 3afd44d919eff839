//! 从生成服务的原始文本中提取 JSON
//!
//! 生成结果不可信：可能被 ```json 代码块包裹，也可能前后夹带说明文字

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::PayloadError;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("valid regex"));

/// 去掉首尾的代码块标记
///
/// 依次去掉开头的 "```json"、开头的 "```"、结尾的 "```"，再去掉首尾空白
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// 尽力提取一个 JSON 值
///
/// 顺序：
/// 1. 去掉首尾代码块标记后整体解析
/// 2. 文本中第一个代码块的内容
/// 3. 第一个 `{` / `[` 到最后一个 `}` / `]` 之间的片段
///
/// 全部失败时返回第 1 步的解析错误
pub fn extract_payload(raw: &str) -> Result<JsonValue, PayloadError> {
    if raw.trim().is_empty() {
        return Err(PayloadError::Empty);
    }

    let stripped = strip_code_fence(raw);
    let first_error = match serde_json::from_str(stripped) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(body) = FENCED_BLOCK.captures(raw).and_then(|caps| caps.get(1)) {
        if let Ok(value) = serde_json::from_str(body.as_str().trim()) {
            return Ok(value);
        }
    }

    if let Some(span) = bracketed_span(raw) {
        if let Ok(value) = serde_json::from_str(span) {
            return Ok(value);
        }
    }

    Err(PayloadError::Malformed(first_error))
}

fn bracketed_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let end = text.rfind(['}', ']'])?;
    (end > start).then(|| &text[start..=end])
}
