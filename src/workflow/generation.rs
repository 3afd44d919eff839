//! 一次生成调用：请求 → 原始文本 → JSON

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::StageError;
use crate::infrastructure::{ContentGenerator, GenerationRequest};
use crate::utils::logging::truncate_text;
use crate::utils::payload::extract_payload;

/// 调用生成服务并提取 JSON
///
/// 生成服务的错误统一转为 `StageError::Generation`，由调用方的本地重试处理
pub async fn fetch_payload(
    generator: &dyn ContentGenerator,
    request: &GenerationRequest,
    attempt: u32,
) -> Result<JsonValue, StageError> {
    debug!("[{}] 第 {} 次生成请求", request.stage, attempt);

    let raw = generator
        .generate(request)
        .await
        .map_err(|e| StageError::Generation(format!("{:#}", e)))?;

    debug!("[{}] 生成结果预览: {}", request.stage, truncate_text(&raw, 120));
    Ok(extract_payload(&raw)?)
}
