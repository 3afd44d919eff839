//! 文档组装 - 基础设施层
//!
//! 把已校验的数据合并进 JSON 模板并写盘。
//! 写盘前合并结果会再过一遍结构校验，模板里的字段不能绕过硬性关卡

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::models::{ComparisonDocument, FaqDocument, ProductPageDocument};
use crate::services::SchemaValidator;

/// 组装能力
///
/// 每个方法返回实际写出的文件路径
#[async_trait]
pub trait Assembler: Send + Sync {
    async fn assemble_faq(
        &self,
        document: &FaqDocument,
        template: &Path,
        output: &Path,
    ) -> Result<PathBuf>;

    async fn assemble_product(
        &self,
        document: &ProductPageDocument,
        template: &Path,
        output: &Path,
    ) -> Result<PathBuf>;

    async fn assemble_comparison(
        &self,
        document: &ComparisonDocument,
        template: &Path,
        output: &Path,
    ) -> Result<PathBuf>;
}

/// 基于本地文件的组装器
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAssembler {
    validator: SchemaValidator,
}

impl FileAssembler {
    pub fn new() -> Self {
        Self {
            validator: SchemaValidator::new(),
        }
    }

    /// 读取模板，要求是 JSON 对象
    async fn load_template(&self, template: &Path) -> Result<Map<String, JsonValue>> {
        let content = tokio::fs::read_to_string(template)
            .await
            .with_context(|| format!("无法读取模板: {}", template.display()))?;

        match serde_json::from_str::<JsonValue>(&content)
            .with_context(|| format!("模板不是合法 JSON: {}", template.display()))?
        {
            JsonValue::Object(map) => Ok(map),
            _ => anyhow::bail!("模板必须是 JSON 对象: {}", template.display()),
        }
    }

    /// 合并 → 复核 → 写盘
    async fn write_document<T, R>(
        &self,
        document: &T,
        template: &Path,
        output: &Path,
        recheck: impl FnOnce(&SchemaValidator, &JsonValue) -> Result<R, ValidationError>,
    ) -> Result<PathBuf>
    where
        T: Serialize + Sync,
    {
        let mut merged = self.load_template(template).await?;

        match serde_json::to_value(document)? {
            JsonValue::Object(fields) => merged.extend(fields),
            other => anyhow::bail!("文档序列化结果不是对象: {}", other),
        }

        let merged = JsonValue::Object(merged);
        recheck(&self.validator, &merged)
            .with_context(|| format!("组装结果未通过校验: {}", output.display()))?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("无法创建输出目录: {}", parent.display()))?;
            }
        }

        let body = serde_json::to_string_pretty(&merged)?;
        tokio::fs::write(output, body)
            .await
            .with_context(|| format!("无法写入文件: {}", output.display()))?;

        debug!("模板 {} -> {}", template.display(), output.display());
        info!("💾 已写出: {}", output.display());
        Ok(output.to_path_buf())
    }
}

#[async_trait]
impl Assembler for FileAssembler {
    async fn assemble_faq(
        &self,
        document: &FaqDocument,
        template: &Path,
        output: &Path,
    ) -> Result<PathBuf> {
        self.write_document(document, template, output, |v, raw| v.validate_faq_document(raw))
            .await
    }

    async fn assemble_product(
        &self,
        document: &ProductPageDocument,
        template: &Path,
        output: &Path,
    ) -> Result<PathBuf> {
        self.write_document(document, template, output, |v, raw| v.validate_product_page(raw))
            .await
    }

    async fn assemble_comparison(
        &self,
        document: &ComparisonDocument,
        template: &Path,
        output: &Path,
    ) -> Result<PathBuf> {
        self.write_document(document, template, output, |v, raw| {
            v.validate_comparison_document(raw)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContentBlocks, ContentBlocksDraft, PriceBlockDraft, ProductDraft, ProductRecord,
    };
    use tempfile::TempDir;

    fn product() -> ProductRecord {
        ProductRecord::try_from(ProductDraft {
            name: "GlowBoost".to_string(),
            concentration: "10% Vitamin C".to_string(),
            skin_type: vec!["Oily".to_string()],
            ingredients: vec!["Vitamin C".to_string()],
            benefits: vec!["Brightening".to_string()],
            usage: "Apply daily".to_string(),
            side_effects: "Mild tingling".to_string(),
            price: 699,
        })
        .unwrap()
    }

    fn product_page() -> ProductPageDocument {
        let blocks = ContentBlocks::try_from(ContentBlocksDraft {
            benefits: vec!["Brightening".to_string(), "Hydration".to_string()],
            usage_block: "Apply 2-3 drops every morning".to_string(),
            ingredients_block: vec!["Vitamin C".to_string()],
            price_block: PriceBlockDraft {
                price: 699,
                currency: Some("INR".to_string()),
            },
        })
        .unwrap();
        ProductPageDocument::from_parts(&product(), &blocks)
    }

    #[tokio::test]
    async fn test_assemble_product_merges_template_and_creates_dir() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("product_template.json");
        tokio::fs::write(&template, r#"{"page_type": "product", "name": "placeholder"}"#)
            .await
            .unwrap();
        let output = dir.path().join("nested/out/product_page.json");

        let assembler = FileAssembler::new();
        let written = assembler
            .assemble_product(&product_page(), &template, &output)
            .await
            .unwrap();

        assert_eq!(written, output);
        let content: JsonValue =
            serde_json::from_str(&tokio::fs::read_to_string(&output).await.unwrap()).unwrap();
        assert_eq!(content["page_type"], "product");
        assert_eq!(content["name"], "GlowBoost");
        assert_eq!(content["pricing"]["currency"], "INR");
        assert_eq!(content["pricing"]["price"], 699);
    }

    #[tokio::test]
    async fn test_template_must_be_an_object() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("bad_template.json");
        tokio::fs::write(&template, "[1, 2, 3]").await.unwrap();
        let output = dir.path().join("product_page.json");

        let result = FileAssembler::new()
            .assemble_product(&product_page(), &template, &output)
            .await;

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = FileAssembler::new()
            .assemble_product(
                &product_page(),
                &dir.path().join("missing.json"),
                &dir.path().join("out.json"),
            )
            .await;
        assert!(result.is_err());
    }
}
