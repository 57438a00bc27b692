/// 报表 API 客户端
///
/// 封装报表接口的 HTTP 调用，不判断响应含义
use crate::error::ApiError;
use crate::infrastructure::ProxyEndpoint;
use crate::models::VerifiedSite;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP 响应（任意状态码）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 报表接口
///
/// 只有网络层失败才返回 `Err`，收到的任何 HTTP 响应都原样返回
#[async_trait]
pub trait ReportApi: Send + Sync {
    /// `POST .../report-requests/{report_type}`
    async fn create_report(
        &self,
        site: &VerifiedSite,
        report_type: &str,
        body: &Value,
    ) -> Result<ApiResponse, ApiError>;

    /// `GET .../report-requests/{report_id}`
    async fn get_report(
        &self,
        site: &VerifiedSite,
        report_id: &str,
    ) -> Result<ApiResponse, ApiError>;
}

/// 基于 reqwest 的报表客户端
pub struct ReportClient {
    http: Client,
}

impl ReportClient {
    /// 创建客户端
    ///
    /// # 参数
    /// - `timeout`: 单次请求超时
    /// - `proxy`: 调试代理；为 `None` 时沿用 HTTP_PROXY / HTTPS_PROXY 环境变量
    pub fn new(timeout: Duration, proxy: Option<&ProxyEndpoint>) -> Result<Self, ApiError> {
        let mut builder = Client::builder().timeout(timeout);

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy.url())
                .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
            // 调试代理会替换证书
            builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    async fn read_response(
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        debug!("响应状态: {} | 响应头: {:?}", status, response.headers());

        let body = response.text().await.map_err(|e| ApiError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;
        debug!("响应内容: {}", body);

        Ok(ApiResponse { url, status, body })
    }
}

#[async_trait]
impl ReportApi for ReportClient {
    async fn create_report(
        &self,
        site: &VerifiedSite,
        report_type: &str,
        body: &Value,
    ) -> Result<ApiResponse, ApiError> {
        let url = site.report_requests_url(report_type);
        debug!("POST {}", url);

        let request = self.http.post(&url).bearer_auth(site.bearer()).json(body);
        Self::read_response(url, request).await
    }

    async fn get_report(
        &self,
        site: &VerifiedSite,
        report_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        let url = site.report_requests_url(report_id);
        debug!("GET {}", url);

        let request = self.http.get(&url).bearer_auth(site.bearer());
        Self::read_response(url, request).await
    }
}
