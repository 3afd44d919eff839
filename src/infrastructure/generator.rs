//! 内容生成服务 - 基础设施层
//!
//! 持有 LLM 客户端，只暴露"给一段提示词、返回一段原始文本"的能力。
//! 返回的文本不可信，解析和校验由流程层负责
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Gemini, Azure, Doubao 等）

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::Stage;

/// 一次生成请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// 发起请求的阶段（便于日志和测试脚本区分）
    pub stage: Stage,
    pub system_message: String,
    pub user_message: String,
}

impl GenerationRequest {
    pub fn new(
        stage: Stage,
        system_message: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            system_message: system_message.into(),
            user_message: user_message.into(),
        }
    }
}

/// 内容生成能力
///
/// 编排器和各阶段适配器只依赖这个 trait，测试中可以替换为脚本化实现
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// 基于 OpenAI 兼容接口的生成服务
pub struct LlmGenerator {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmGenerator {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl ContentGenerator for LlmGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(
            "[{}] 调用 LLM API，模型: {}，用户消息 {} 字符",
            request.stage,
            self.model_name,
            request.user_message.chars().count()
        );

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_message.as_str())
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_message.as_str())
            .build()?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("[{}] LLM API 调用失败: {}", request.stage, e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        debug!("[{}] LLM API 调用成功", request.stage);
        Ok(content.trim().to_string())
    }
}
