/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::article::ArticleRequest;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 info，开启详细日志时为 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - AI 文章生成");
    info!("🤖 模型: {}", config.gemini_model_name);
    info!(
        "📊 配额: {} 次/分钟, {} token/分钟, {} 次/天",
        config.requests_per_minute, config.tokens_per_minute, config.requests_per_day
    );
    info!("{}", "=".repeat(60));
}

/// 记录单篇文章开始
pub fn log_article_start(request: &ArticleRequest) {
    info!("\n{}", "=".repeat(60));
    info!("📄 话题: {}", request.topic);
    info!(
        "👥 读者: {} | 语气: {} | 每章问题数: {}",
        request.audience,
        request.tone,
        request.questions_per_section()
    );
    if !request.focus.trim().is_empty() {
        info!("🎯 重点: {}", truncate_text(request.focus.trim(), 80));
    }
    info!("{}", "=".repeat(60));
}

/// 记录单篇文章完成
///
/// # 参数
/// - `output_path`: 文章写入路径
/// - `calls`: 本进程累计的 API 调用次数
pub fn log_article_complete(output_path: &str, calls: u64) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✅ 文章生成完成 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📁 输出文件: {}", output_path);
    info!("📞 累计 API 调用: {} 次", calls);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
