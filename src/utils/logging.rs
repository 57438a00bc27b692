/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use crate::config::Config;
use crate::workflow::FlowOutcome;
use tracing::{error, info};

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    info!("👤 配置: {}", config.customer);
    info!("📊 报表类型: {}", config.report.report_type);
    info!(
        "🔁 提交重试: {} 次 | 轮询重试: {} 次",
        config.retry_options.retries, config.polling_options.retries
    );
    info!("{}", "=".repeat(60));
}

/// 打印最终结果
///
/// # 参数
/// - `outcome`: 流程结果
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(outcome: &FlowOutcome, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match (&outcome.output, &outcome.error) {
        (Some(path), _) => info!("✅ 报表已保存至: {}", path.display()),
        (None, Some(e)) => error!("❌ 失败 ({} 阶段): {}", outcome.failed_in_label(), e),
        (None, None) => error!("❌ 失败"),
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("报表内容很长", 2), "报表...");
    }
}
