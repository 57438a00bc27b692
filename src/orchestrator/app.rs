//! 应用入口 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：检查调试代理、创建 HTTP 客户端
//! 2. **执行流程**：委托 `ReportFlow` 完成提交、轮询、写文件
//! 3. **结果输出**：打印最终结果，返回是否成功

use crate::clients::{ReportApi, ReportClient};
use crate::config::Config;
use crate::infrastructure::detect_debug_proxy;
use crate::services::{OutputSink, OutputWriter};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{FlowOutcome, ReportFlow};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// 应用主结构
pub struct App {
    config: Config,
    flow: ReportFlow,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);
        debug!("配置: {:?}", config);

        let proxy = if config.debug.check_proxy {
            info!("正在检查调试代理是否运行...");
            let found = detect_debug_proxy(&config.debug.proxy_endpoint()).await;
            if found.is_some() {
                info!("请求将通过调试代理发送");
            }
            found
        } else {
            None
        };

        let client = ReportClient::new(config.debug.request_timeout(), proxy.as_ref())?;
        let api: Arc<dyn ReportApi> = Arc::new(client);
        let sink: Arc<dyn OutputSink> = Arc::new(OutputWriter::new());

        Ok(Self::with_parts(config, api, sink))
    }

    /// 使用指定的 API 和输出目标组装应用
    pub fn with_parts(config: Config, api: Arc<dyn ReportApi>, sink: Arc<dyn OutputSink>) -> Self {
        let flow = ReportFlow::new(&config, api, sink);
        Self { config, flow }
    }

    /// 运行应用主逻辑
    ///
    /// # 返回
    /// 流程到达 Done 时返回 true
    pub async fn run(&self) -> bool {
        let outcome: FlowOutcome = self.flow.run().await;

        let log_file = self.config.debug.log_file_path();
        print_final_stats(&outcome, &log_file.display().to_string());

        outcome.succeeded()
    }
}
