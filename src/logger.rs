//! 日志初始化
//!
//! 同时输出到控制台和本次运行的日志文件，每次运行都会覆盖旧的日志文件

use crate::config::DebugConfig;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志
///
/// RUST_LOG 优先，其次使用配置中的 `logging_level`
///
/// # 返回
/// 返回日志文件路径
pub fn init(debug: &DebugConfig) -> Result<PathBuf> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&debug.logging_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fs::create_dir_all(&debug.log_path)
        .with_context(|| format!("无法创建日志目录: {}", debug.log_path.display()))?;

    let log_file_path = debug.log_file_path();
    let log_file = File::create(&log_file_path)
        .with_context(|| format!("无法创建日志文件: {}", log_file_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .try_init()
        .context("日志系统已初始化")?;

    Ok(log_file_path)
}

/// 只输出到控制台，用于测试
pub fn init_console() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
