//! 各阶段的提示词
//!
//! 生成内容面向英文电商页面，所以提示词用英文

use serde_json::Value as JsonValue;

use crate::infrastructure::GenerationRequest;
use crate::models::{ProductRecord, Stage, FAQ_BATCH_SIZE};

const SYSTEM_MESSAGE: &str =
    "You are a product content writer for an Indian skincare store. \
     Reply with a single JSON value and nothing else: no markdown, no commentary.";

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

pub fn parser_request(raw_product: &JsonValue) -> GenerationRequest {
    let user_message = format!(
        r#"Clean up the product data below into a normalized record.

Product data:
{}

Return a JSON object with exactly these keys:
name, concentration, skin_type, ingredients, benefits, usage, side_effects, price.
skin_type, ingredients and benefits are arrays of strings; price is an integer amount in INR."#,
        pretty(raw_product)
    );
    GenerationRequest::new(Stage::Parse, SYSTEM_MESSAGE, user_message)
}

pub fn question_request(product: &ProductRecord) -> GenerationRequest {
    let user_message = format!(
        r#"Write exactly {count} frequently asked questions, with answers, for this product.

Product:
{product}

Rules:
- every question is a full sentence ending with "?"
- answers come from the product data and are at least one full sentence long
- no two questions may be the same
- category is one of: informational, usage, safety, purchase

Return a JSON array of {count} objects shaped like
{{"question": "...", "answer": "...", "category": "..."}}"#,
        count = FAQ_BATCH_SIZE,
        product = pretty(product)
    );
    GenerationRequest::new(Stage::Questions, SYSTEM_MESSAGE, user_message)
}

pub fn block_request(product: &ProductRecord) -> GenerationRequest {
    let user_message = format!(
        r#"Write the content blocks for this product page.

Product:
{}

Return a JSON object with these keys:
- benefits: array of at least two short benefit statements
- usage_block: one usage instruction sentence
- ingredients_block: array of ingredient names
- price_block: {{"price": <integer>, "currency": "INR"}}"#,
        pretty(product)
    );
    GenerationRequest::new(Stage::Blocks, SYSTEM_MESSAGE, user_message)
}

pub fn comparison_request(product_a: &ProductRecord) -> GenerationRequest {
    let user_message = format!(
        r#"Invent a fictional competitor for the product below.
It must have a different price and a different concentration.

Product A:
{}

Return a JSON object {{"product_b": {{...}}}} where product_b has the keys
name, concentration, skin_type, ingredients, benefits, usage, side_effects, price
(price is an integer in INR)."#,
        pretty(product_a)
    );
    GenerationRequest::new(Stage::Comparison, SYSTEM_MESSAGE, user_message)
}
