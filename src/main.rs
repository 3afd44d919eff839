use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use product_content_pipeline::utils::logging;
use product_content_pipeline::{Config, FileAssembler, LlmGenerator, PipelineOrchestrator};
use tracing::error;

/// 加载配置：设置了 `PIPELINE_CONFIG` 时读 TOML 文件，否则读环境变量
fn load_config() -> Result<Config> {
    match std::env::var("PIPELINE_CONFIG") {
        Ok(path) => Ok(Config::from_toml_file(&PathBuf::from(path))?),
        Err(_) => Ok(Config::from_env()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init(false);
            error!("❌ 配置加载失败: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    let input_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.input_file.clone());
    logging::log_startup(&input_path, &config.llm_model_name);

    let generator = Arc::new(LlmGenerator::new(&config));
    let assembler = Arc::new(FileAssembler::new());
    let mut orchestrator = PipelineOrchestrator::new(config, generator, assembler);

    match orchestrator.run(&input_path).await {
        Ok(report) => {
            logging::print_final_report(
                report.outputs.iter(),
                report.question_attempts,
                report.average_quality_score,
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ 流水线失败: {}", e);
            ExitCode::FAILURE
        }
    }
}
