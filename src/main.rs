use anyhow::Result;
use report_fetch::{logger, App, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    let log_file = logger::init(&config.debug)?;
    info!("已加载配置: {} (日志文件: {})", config.customer, log_file.display());

    // 初始化并运行应用
    let succeeded = App::initialize(config).await?.run().await;

    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}
