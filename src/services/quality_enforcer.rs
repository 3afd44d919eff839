//! 质量检查 - 业务能力层
//!
//! 结构合法但内容质量差的生成结果在这里被拦下：
//! - 问题去重、打分
//! - 内容块、对比结果的语义充分性检查
//!
//! 只负责判断，不负责重试

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::models::{ComparisonResult, ContentBlocks, FaqBatch, QuestionRecord};

/// 低于此分数的问题视为低质量
pub const MIN_QUALITY_SCORE: u8 = 50;

/// 问句中应至少出现一个的疑问 / 情态提示词
const CUE_WORDS: [&str; 8] = [
    "how", "what", "why", "when", "which", "can", "should", "does",
];

/// 质量检查器
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityEnforcer;

impl QualityEnforcer {
    pub fn new() -> Self {
        Self
    }

    /// 按问题文本去重（小写 + 去首尾空白），保留首次出现的顺序
    ///
    /// 不按答案或类别去重
    pub fn deduplicate_questions(&self, questions: Vec<QuestionRecord>) -> Vec<QuestionRecord> {
        let before = questions.len();
        let mut seen = HashSet::new();
        let mut deduplicated = Vec::with_capacity(before);

        for question in questions {
            let key = question.question().trim().to_lowercase();
            if seen.insert(key) {
                deduplicated.push(question);
            } else {
                warn!("🗑️ 移除重复问题: {}", question.question());
            }
        }

        info!("去重: {} -> {}", before, deduplicated.len());
        deduplicated
    }

    /// 给单个问题打分（0-100）
    ///
    /// 从 100 开始逐项扣分，所有适用的扣分项都会叠加，最低为 0
    pub fn score_question(&self, question: &QuestionRecord) -> u8 {
        let question_text = question.question();
        let answer_text = question.answer();
        let mut score: i32 = 100;

        if question_text.chars().count() < 10 {
            score -= 30;
        }

        if answer_text.chars().count() < 20 {
            score -= 20;
        }

        if question_text.matches(' ').count() < 3 {
            score -= 20;
        }

        if !question_text.ends_with('?') {
            score -= 10;
        }

        let lowered = question_text.to_lowercase();
        if !CUE_WORDS.iter().any(|word| lowered.contains(word)) {
            score -= 15;
        }

        if lowered == answer_text.to_lowercase() {
            score -= 50;
        }

        score.max(0) as u8
    }

    /// 给整批问题打分并写入 `quality_score`，返回平均分
    pub fn score_questions(&self, batch: &mut FaqBatch) -> f64 {
        for question in batch.questions_mut() {
            let score = self.score_question(question);
            question.set_quality_score(score);
        }

        let total: u32 = batch
            .iter()
            .filter_map(|q| q.quality_score())
            .map(u32::from)
            .sum();
        let average = if batch.is_empty() {
            0.0
        } else {
            f64::from(total) / batch.len() as f64
        };

        info!("问题质量评分: 平均 {:.1}", average);
        average
    }

    /// 低于阈值的问题
    pub fn low_quality_questions<'a>(&self, batch: &'a FaqBatch) -> Vec<&'a QuestionRecord> {
        batch
            .iter()
            .filter(|q| q.quality_score().is_some_and(|s| s < MIN_QUALITY_SCORE))
            .collect()
    }

    /// 内容块是否充分
    ///
    /// 功效至少 2 条、成分至少 1 条、用法至少 10 个字符
    pub fn validate_block_quality(&self, blocks: &ContentBlocks) -> bool {
        if blocks.benefits().len() < 2 {
            error!("内容块中的功效不足 2 条");
            return false;
        }

        if blocks.ingredients_block().is_empty() {
            error!("内容块中缺少成分");
            return false;
        }

        if blocks.usage_block().chars().count() < 10 {
            error!("用法说明过短");
            return false;
        }

        true
    }

    /// 对比结果是否低质量：价差为 0 或没有更强的配方
    pub fn detect_low_quality_comparison(&self, comparison: &ComparisonResult) -> bool {
        if comparison.price_difference == 0 {
            warn!("价差为 0，对比结果质量偏低");
            return true;
        }

        if comparison.stronger_formulation.is_empty() {
            warn!("未能区分出更强的配方");
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentBlocksDraft, PriceBlockDraft, QuestionCategory};

    fn question(text: &str, answer: &str) -> QuestionRecord {
        QuestionRecord::new(text, answer, QuestionCategory::Informational)
    }

    fn blocks(benefits: &[&str], usage: &str, ingredients: &[&str]) -> ContentBlocks {
        ContentBlocks::try_from(ContentBlocksDraft {
            benefits: benefits.iter().map(|s| s.to_string()).collect(),
            usage_block: usage.to_string(),
            ingredients_block: ingredients.iter().map(|s| s.to_string()).collect(),
            price_block: PriceBlockDraft {
                price: 699,
                currency: None,
            },
        })
        .unwrap()
    }

    #[test]
    fn test_deduplicate_is_case_insensitive_and_order_preserving() {
        let enforcer = QualityEnforcer::new();
        let questions = vec![
            question("What is this?", "first"),
            question("WHAT IS THIS?", "second"),
            question("How to use?", "third"),
        ];

        let result = enforcer.deduplicate_questions(questions);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].question(), "What is this?");
        assert_eq!(result[0].answer(), "first");
        assert_eq!(result[1].question(), "How to use?");
    }

    #[test]
    fn test_deduplicate_trims_but_ignores_answer_and_category() {
        let enforcer = QualityEnforcer::new();
        let questions = vec![
            QuestionRecord::new("  Is it safe? ", "Yes", QuestionCategory::Safety),
            QuestionRecord::new("is it safe?", "Yes", QuestionCategory::Purchase),
            QuestionRecord::new("Is it vegan?", "Yes", QuestionCategory::Safety),
        ];

        let result = enforcer.deduplicate_questions(questions);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].category(), QuestionCategory::Safety);
    }

    #[test]
    fn test_well_formed_question_scores_full_marks() {
        let enforcer = QualityEnforcer::new();
        let q = question(
            "How often should I apply this serum?",
            "Apply it once daily in the morning before sunscreen.",
        );
        assert_eq!(enforcer.score_question(&q), 100);
    }

    #[test]
    fn test_short_question_scores_lower() {
        let enforcer = QualityEnforcer::new();
        let short = question("Why?", "Because it works well");
        let long = question("Why is this product effective?", "Because it works well");

        let short_score = enforcer.score_question(&short);
        let long_score = enforcer.score_question(&long);
        assert!(short_score < long_score);
        assert_eq!(long_score, 100);
        // 过短 -30，少于 3 个空格 -20
        assert_eq!(short_score, 50);
    }

    #[test]
    fn test_penalties_stack() {
        let enforcer = QualityEnforcer::new();
        // 答案过短 -20，缺少问号 -10，缺少提示词 -15
        let q = question("Tell me about the price", "Rs 699");
        assert_eq!(enforcer.score_question(&q), 55);
    }

    #[test]
    fn test_identical_question_and_answer_scores_below_threshold() {
        let enforcer = QualityEnforcer::new();
        let q = question("What is it?", "WHAT IS IT?");
        assert!(enforcer.score_question(&q) < MIN_QUALITY_SCORE);

        // 仅"问答相同"一项就扣 50
        let long = question(
            "What does this serum do for my skin?",
            "WHAT DOES THIS SERUM DO FOR MY SKIN?",
        );
        assert_eq!(enforcer.score_question(&long), 50);
    }

    #[test]
    fn test_score_floor_is_zero() {
        let enforcer = QualityEnforcer::new();
        let q = question("ok", "OK");
        assert_eq!(enforcer.score_question(&q), 0);
    }

    #[test]
    fn test_score_questions_attaches_scores() {
        let enforcer = QualityEnforcer::new();
        let questions: Vec<QuestionRecord> = (0..15)
            .map(|i| {
                question(
                    &format!("What is benefit number {i} of this serum?"),
                    "It brightens and evens out the skin tone.",
                )
            })
            .collect();
        let mut batch = FaqBatch::try_from(questions).unwrap();

        let average = enforcer.score_questions(&mut batch);
        assert_eq!(average, 100.0);
        assert!(batch.iter().all(|q| q.quality_score() == Some(100)));
        assert!(enforcer.low_quality_questions(&batch).is_empty());
    }

    #[test]
    fn test_validate_block_quality() {
        let enforcer = QualityEnforcer::new();
        let good = blocks(&["Brightening", "Hydration"], "Apply 2 drops daily", &["Vitamin C"]);
        assert!(enforcer.validate_block_quality(&good));

        let few_benefits = blocks(&["Brightening"], "Apply 2 drops daily", &["Vitamin C"]);
        assert!(!enforcer.validate_block_quality(&few_benefits));

        let no_ingredients = blocks(&["Brightening", "Hydration"], "Apply 2 drops daily", &[]);
        assert!(!enforcer.validate_block_quality(&no_ingredients));

        let short_usage = blocks(&["Brightening", "Hydration"], "Apply", &["Vitamin C"]);
        assert!(!enforcer.validate_block_quality(&short_usage));
    }

    #[test]
    fn test_detect_low_quality_comparison() {
        let enforcer = QualityEnforcer::new();
        let mut comparison = ComparisonResult {
            stronger_formulation: "GlowBoost".to_string(),
            price_difference: -200,
            better_for_oily_skin: "GlowBoost".to_string(),
        };
        assert!(!enforcer.detect_low_quality_comparison(&comparison));

        comparison.price_difference = 0;
        assert!(enforcer.detect_low_quality_comparison(&comparison));

        comparison.price_difference = 150;
        comparison.stronger_formulation = String::new();
        assert!(enforcer.detect_low_quality_comparison(&comparison));
    }
}
