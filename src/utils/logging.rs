/// 日志工具模块
///
/// 提供日志初始化和流水线各节点的格式化输出
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::Stage;

/// 初始化全局日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug 或 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能被多次调用，重复初始化直接忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `input_path`: 产品输入文件
/// - `model_name`: 生成服务使用的模型
pub fn log_startup(input_path: &Path, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 产品内容流水线启动");
    info!(
        "🕒 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📄 输入文件: {}", input_path.display());
    info!("🤖 模型: {}", model_name);
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始
pub fn log_stage_start(stage: Stage) {
    info!("\n{}", "─".repeat(60));
    info!("▶️ 阶段开始: {}", stage);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `outputs`: 已写出的文档路径
/// - `question_attempts`: FAQ 生成用掉的外层尝试次数
/// - `average_quality_score`: FAQ 平均质量分
pub fn print_final_report<'a>(
    outputs: impl IntoIterator<Item = &'a Path>,
    question_attempts: u32,
    average_quality_score: f64,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 流水线完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🔁 FAQ 生成尝试次数: {}", question_attempts);
    info!("⭐ FAQ 平均质量分: {:.1}", average_quality_score);
    for path in outputs {
        info!("💾 {}", path.display());
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("精华液使用方法", 3), "精华液...");
    }
}
