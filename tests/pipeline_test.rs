use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tempfile::TempDir;

use product_content_pipeline::models::Stage;
use product_content_pipeline::orchestrator::{PipelineEvent, RecordingEventSink};
use product_content_pipeline::{
    Config, ContentGenerator, FileAssembler, GenerationRequest, PipelineError,
    PipelineOrchestrator, PipelineState,
};

// ========== 脚本化生成服务 ==========

/// 按阶段返回预设回复；队列只剩最后一条时重复返回它
#[derive(Default)]
struct ScriptedGenerator {
    replies: Mutex<HashMap<Stage, VecDeque<String>>>,
    calls: Mutex<HashMap<Stage, usize>>,
}

impl ScriptedGenerator {
    fn script(self, stage: Stage, replies: Vec<String>) -> Self {
        self.replies.lock().unwrap().insert(stage, replies.into());
        self
    }

    fn calls(&self, stage: Stage) -> usize {
        self.calls.lock().unwrap().get(&stage).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        *self.calls.lock().unwrap().entry(request.stage).or_default() += 1;

        let mut replies = self.replies.lock().unwrap();
        let queue = replies
            .get_mut(&request.stage)
            .ok_or_else(|| anyhow::anyhow!("没有为 {} 准备回复", request.stage))?;
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        reply.ok_or_else(|| anyhow::anyhow!("{} 的回复已用完", request.stage))
    }
}

// ========== 测试数据 ==========

fn parsed_product() -> String {
    json!({
        "name": "GlowBoost Vitamin C Serum",
        "concentration": "10% Vitamin C",
        "skin_type": ["Oily", "Combination"],
        "ingredients": ["Vitamin C", "Hyaluronic Acid"],
        "benefits": ["Brightening", "Fades dark spots"],
        "usage": "Apply 2-3 drops in the morning before sunscreen",
        "side_effects": "Mild tingling for sensitive skin",
        "price": "₹699"
    })
    .to_string()
}

fn faq_item(i: usize) -> JsonValue {
    let categories = ["informational", "usage", "safety", "purchase"];
    json!({
        "question": format!("What is benefit number {} of this serum?", i),
        "answer": "It brightens dull skin and fades dark spots over a few weeks.",
        "category": categories[i % categories.len()]
    })
}

fn faqs(count: usize) -> String {
    let items: Vec<JsonValue> = (0..count).map(faq_item).collect();
    format!("```json\n{}\n```", JsonValue::Array(items))
}

/// 15 条，但其中 3 条与前面的问题重复（仅大小写不同）
fn faqs_with_duplicates() -> String {
    let mut items: Vec<JsonValue> = (0..12).map(faq_item).collect();
    for i in 0..3 {
        let mut duplicate = faq_item(i);
        duplicate["question"] = json!(format!("WHAT IS BENEFIT NUMBER {} OF THIS SERUM?", i));
        items.push(duplicate);
    }
    JsonValue::Array(items).to_string()
}

/// 15 条不重复，但有一条问答完全相同
fn faqs_with_low_score() -> String {
    let mut items: Vec<JsonValue> = (0..15).map(faq_item).collect();
    items[7] = json!({"question": "Is it ok?", "answer": "is it ok?", "category": "safety"});
    JsonValue::Array(items).to_string()
}

fn blocks() -> String {
    json!({
        "benefits": ["Brightens dull skin", "Fades dark spots"],
        "usage_block": "Apply 2-3 drops every morning before sunscreen",
        "ingredients_block": ["Vitamin C", "Hyaluronic Acid"],
        "price_block": {"price": 699, "currency": "INR"}
    })
    .to_string()
}

fn thin_blocks() -> String {
    json!({
        "benefits": ["Brightens"],
        "usage_block": "Apply",
        "ingredients_block": [],
        "price_block": {"price": 699}
    })
    .to_string()
}

fn competitor(price: JsonValue, concentration: &str) -> String {
    json!({
        "product_b": {
            "name": "RadiantMax Serum",
            "concentration": concentration,
            "skin_type": ["Dry"],
            "ingredients": ["Vitamin C", "Ferulic Acid"],
            "benefits": ["Brightening"],
            "usage": "Apply at night",
            "side_effects": "None known",
            "price": price
        },
        "comparison": {
            "stronger_formulation": "RadiantMax Serum",
            "price_difference": 12345,
            "better_for_oily_skin": "RadiantMax Serum"
        }
    })
    .to_string()
}

fn happy_generator() -> ScriptedGenerator {
    ScriptedGenerator::default()
        .script(Stage::Parse, vec![parsed_product()])
        .script(Stage::Questions, vec![faqs(15)])
        .script(Stage::Blocks, vec![blocks()])
        .script(Stage::Comparison, vec![competitor(json!(899), "15% Vitamin C")])
}

// ========== 运行环境 ==========

struct Harness {
    dir: TempDir,
    input: PathBuf,
    config: Config,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input_product.json");
        std::fs::write(&input, r#"{"product_name": "GlowBoost", "price": "₹699"}"#).unwrap();

        let config = Config {
            llm_api_key: "test-key".to_string(),
            retry_delay_ms: 0,
            output_dir: dir.path().join("out"),
            templates_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"),
            ..Config::default()
        };

        Self { dir, input, config }
    }

    fn orchestrator(
        &self,
        generator: &Arc<ScriptedGenerator>,
        sink: &Arc<RecordingEventSink>,
    ) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            self.config.clone(),
            generator.clone(),
            Arc::new(FileAssembler::new()),
        )
        .with_event_sink(sink.clone())
    }

    fn read_output(&self, name: &str) -> JsonValue {
        let content = std::fs::read_to_string(self.config.output_dir.join(name)).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

fn quality_failures(sink: &RecordingEventSink) -> usize {
    sink.events()
        .iter()
        .filter(|e| matches!(e, PipelineEvent::QualityAttemptFailed { .. }))
        .count()
}

// ========== 测试 ==========

#[tokio::test]
async fn test_happy_path_writes_three_documents() {
    let harness = Harness::new();
    let generator = Arc::new(happy_generator());
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let report = orchestrator.run(&harness.input).await.unwrap();

    assert_eq!(orchestrator.state(), &PipelineState::Assembled);
    assert_eq!(report.question_attempts, 1);
    assert_eq!(report.average_quality_score, 100.0);
    assert_eq!(
        sink.states(),
        vec![
            PipelineState::InputLoaded,
            PipelineState::Parsed,
            PipelineState::QuestionsGenerated,
            PipelineState::BlocksGenerated,
            PipelineState::ComparisonGenerated,
            PipelineState::Assembled,
        ]
    );
    for path in report.outputs.iter() {
        assert!(path.exists(), "{} 应已写出", path.display());
    }

    let faq = harness.read_output("faq.json");
    assert_eq!(faq["page_type"], "faq");
    assert_eq!(faq["faqs"].as_array().unwrap().len(), 15);
    assert_eq!(faq["faqs"][0]["quality_score"], 100);

    let product = harness.read_output("product_page.json");
    assert_eq!(product["name"], "GlowBoost Vitamin C Serum");
    assert_eq!(product["pricing"]["price"], 699);
    assert_eq!(product["pricing"]["currency"], "INR");

    // 对比数字来自确定性计算，生成服务给的 12345 被丢弃
    let comparison = harness.read_output("comparison_page.json");
    assert_eq!(comparison["comparison"]["price_difference"], -200);
    assert_eq!(comparison["comparison"]["stronger_formulation"], "RadiantMax Serum");
    assert_eq!(
        comparison["comparison"]["better_for_oily_skin"],
        "GlowBoost Vitamin C Serum"
    );
    assert_eq!(comparison["analysis"]["price_range_a"], "Mid-range");
    assert_eq!(comparison["analysis"]["ingredient_overlap"]["common"], json!(["vitamin c"]));
}

#[tokio::test]
async fn test_recovers_after_one_recoverable_question_failure() {
    let harness = Harness::new();
    let generator = Arc::new(
        happy_generator().script(Stage::Questions, vec![faqs_with_duplicates(), faqs(15)]),
    );
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let report = orchestrator.run(&harness.input).await.unwrap();

    assert_eq!(report.question_attempts, 2);
    assert_eq!(generator.calls(Stage::Questions), 2);
    assert_eq!(quality_failures(&sink), 1);
    assert_eq!(orchestrator.state(), &PipelineState::Assembled);
}

#[tokio::test]
async fn test_low_scoring_question_triggers_regeneration() {
    let harness = Harness::new();
    let generator = Arc::new(
        happy_generator().script(Stage::Questions, vec![faqs_with_low_score(), faqs(15)]),
    );
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let report = orchestrator.run(&harness.input).await.unwrap();
    assert_eq!(report.question_attempts, 2);
}

#[tokio::test]
async fn test_fails_after_exactly_three_recoverable_failures() {
    let harness = Harness::new();
    let generator =
        Arc::new(happy_generator().script(Stage::Questions, vec![faqs_with_duplicates()]));
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let err = orchestrator.run(&harness.input).await.unwrap_err();

    assert!(matches!(err, PipelineError::NonRecoverable(_)));
    assert_eq!(generator.calls(Stage::Questions), 3);
    assert_eq!(quality_failures(&sink), 3);
    assert_eq!(generator.calls(Stage::Blocks), 0);
    assert!(matches!(orchestrator.state(), PipelineState::Aborted(_)));
    assert!(!harness.config.output_dir.join("faq.json").exists());
}

#[tokio::test]
async fn test_wrong_question_count_aborts_without_retry() {
    let harness = Harness::new();
    let generator = Arc::new(happy_generator().script(Stage::Questions, vec![faqs(14)]));
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let err = orchestrator.run(&harness.input).await.unwrap_err();

    assert!(!err.is_recoverable());
    assert!(err.reason().contains("faq_count"));
    assert_eq!(generator.calls(Stage::Questions), 1);
    assert_eq!(quality_failures(&sink), 0);
}

#[tokio::test]
async fn test_stage_local_retries_cover_block_and_comparison_quality() {
    let harness = Harness::new();
    let generator = Arc::new(
        happy_generator()
            .script(Stage::Blocks, vec![thin_blocks(), blocks()])
            .script(
                Stage::Comparison,
                vec![
                    competitor(json!(699), "15% Vitamin C"),
                    competitor(json!("₹899"), "15% Vitamin C"),
                ],
            ),
    );
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    orchestrator.run(&harness.input).await.unwrap();

    assert_eq!(generator.calls(Stage::Blocks), 2);
    assert_eq!(generator.calls(Stage::Comparison), 2);
    let comparison = harness.read_output("comparison_page.json");
    assert_eq!(comparison["product_b"]["price"], 899);
}

#[tokio::test]
async fn test_comparison_without_clear_winner_is_accepted_after_retries() {
    let harness = Harness::new();
    // 每次给出的竞品浓度都与 A 相同
    let generator = Arc::new(
        happy_generator().script(Stage::Comparison, vec![competitor(json!(899), "10% Vitamin C")]),
    );
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let report = orchestrator.run(&harness.input).await.unwrap();

    assert_eq!(orchestrator.state(), &PipelineState::Assembled);
    assert_eq!(
        generator.calls(Stage::Comparison),
        harness.config.max_retries as usize
    );
    assert!(report.outputs.iter().all(|path| path.exists()));

    let comparison = harness.read_output("comparison_page.json");
    assert_eq!(comparison["comparison"]["stronger_formulation"], "");
    assert_eq!(comparison["comparison"]["price_difference"], -200);
}

#[tokio::test]
async fn test_exhausted_stage_retries_abort_the_run() {
    let harness = Harness::new();
    let generator = Arc::new(
        happy_generator().script(Stage::Parse, vec!["Sorry, I cannot help.".to_string()]),
    );
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let err = orchestrator.run(&harness.input).await.unwrap_err();

    assert!(matches!(err, PipelineError::NonRecoverable(_)));
    assert_eq!(generator.calls(Stage::Parse), harness.config.max_retries as usize);
    assert_eq!(generator.calls(Stage::Questions), 0);
}

#[tokio::test]
async fn test_abort_during_assembly_removes_written_outputs() {
    let mut harness = Harness::new();

    // 模板目录里缺少对比页模板：FAQ 和产品页写出后组装失败
    let templates = harness.dir.path().join("templates");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(templates.join("faq_template.json"), "{}").unwrap();
    std::fs::write(templates.join("product_template.json"), "{}").unwrap();
    harness.config.templates_dir = templates;

    let generator = Arc::new(happy_generator());
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let err = orchestrator.run(&harness.input).await.unwrap_err();

    assert!(!err.is_recoverable());
    assert!(matches!(orchestrator.state(), PipelineState::Aborted(_)));
    assert_eq!(orchestrator.tracked_outputs().len(), 3);
    for path in orchestrator.tracked_outputs() {
        assert!(!path.exists(), "{} 应已被删除", path.display());
    }

    let removed: Vec<PathBuf> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            PipelineEvent::OutputRemoved { path } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(
        removed,
        vec![
            harness.config.output_dir.join("faq.json"),
            harness.config.output_dir.join("product_page.json"),
        ]
    );
}

#[tokio::test]
async fn test_missing_input_aborts_before_any_generation() {
    let harness = Harness::new();
    let generator = Arc::new(happy_generator());
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let err = orchestrator
        .run(&harness.dir.path().join("missing.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NonRecoverable(_)));
    assert_eq!(generator.calls(Stage::Parse), 0);
    assert!(orchestrator.tracked_outputs().is_empty());
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, PipelineEvent::Aborted { .. })));
}

#[tokio::test]
async fn test_invalid_config_aborts_in_init() {
    let mut harness = Harness::new();
    harness.config.llm_api_key = String::new();
    let generator = Arc::new(happy_generator());
    let sink = Arc::new(RecordingEventSink::new());
    let mut orchestrator = harness.orchestrator(&generator, &sink);

    let err = orchestrator.run(&harness.input).await.unwrap_err();

    assert!(err.reason().contains("API"));
    assert_eq!(sink.states().len(), 1);
    assert!(matches!(sink.states()[0], PipelineState::Aborted(_)));
}
