//! 调试代理探测 - 基础设施层
//!
//! 本地开着 Fiddler 时，把所有请求都转发过去方便抓包

use std::time::Duration;
use tracing::{debug, info};

/// Fiddler 回显页面中的标记文本
const ECHO_MARKER: &str = "Fiddler Echo Service";

/// 调试代理地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub address: String,
    pub port: u16,
}

impl ProxyEndpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

/// 检查调试代理是否在运行
///
/// 访问代理的回显页面，页面包含 Fiddler 标记时返回代理地址，
/// 其余情况（连接失败、超时、内容不符）一律返回 `None`
pub async fn detect_debug_proxy(endpoint: &ProxyEndpoint) -> Option<ProxyEndpoint> {
    let echo_page = endpoint.url();
    debug!("检查调试代理: {}", echo_page);

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(2))
        .build()
        .ok()?;

    let body = match client.get(&echo_page).send().await {
        Ok(response) => response.text().await.unwrap_or_default(),
        Err(e) => {
            debug!("调试代理不可用: {}", e);
            return None;
        }
    };

    if body.contains(ECHO_MARKER) {
        info!("✓ 检测到调试代理: {}", echo_page);
        Some(endpoint.clone())
    } else {
        debug!("{} 不是调试代理", echo_page);
        None
    }
}
