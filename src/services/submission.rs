//! 报表提交服务 - 业务能力层
//!
//! 只负责"提交报表请求并拿到报表ID"，失败时按重试策略重试

use crate::clients::{ApiResponse, ReportApi};
use crate::error::{RequestFailure, SubmissionError};
use crate::infrastructure::{retry_with_backoff, Attempt, RetryError, RetryPolicy};
use crate::models::{ReportHandle, ReportRequestSpec, ReportStatus, Timeframe, VerifiedSite};
use crate::utils::truncate_text;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};

/// 日志中响应内容的最大长度
const SNIPPET_LEN: usize = 200;

/// 报表提交服务
pub struct ReportSubmitter {
    api: Arc<dyn ReportApi>,
    policy: RetryPolicy,
}

impl ReportSubmitter {
    pub fn new(api: Arc<dyn ReportApi>, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    /// 提交报表请求
    ///
    /// # 参数
    /// - `spec`: 报表请求（null 字段在发送前去掉）
    /// - `site`: 已校验的站点信息
    ///
    /// # 返回
    /// 返回报表ID；重试耗尽后返回 `SubmissionError`
    pub async fn submit(
        &self,
        spec: &ReportRequestSpec,
        site: &VerifiedSite,
    ) -> Result<ReportHandle, SubmissionError> {
        async {
            let body = spec.stripped_body();
            debug!("请求参数: {}", body);

            if let Some(token) = spec.timeframe() {
                match Timeframe::parse(token) {
                    Some(timeframe) => {
                        let (start, end) = timeframe.window(chrono::Utc::now());
                        info!(
                            "使用时间窗口: {} 推算开始: {} 推算结束: {}",
                            token,
                            start.to_rfc3339(),
                            end.to_rfc3339()
                        );
                    }
                    None => info!("使用时间窗口: {}", token),
                }
            }

            let report_type = spec.report_type.as_str();
            let body = &body;
            let result = retry_with_backoff(&self.policy, "submit_report", move |attempt| {
                self.attempt(site, report_type, body, attempt)
            })
            .await;

            match result {
                Ok(handle) => {
                    info!("✓ 报表请求已提交，报表ID: {}", handle);
                    Ok(handle)
                }
                Err(RetryError::Exhausted { attempts, last }) => {
                    error!("❌ 报表请求提交失败 (已尝试 {} 次)", attempts);
                    Err(SubmissionError::Exhausted { attempts, last })
                }
                Err(RetryError::Aborted { attempt, error }) => {
                    error!("❌ 报表请求提交失败 (第 {} 次尝试)", attempt);
                    Err(SubmissionError::Rejected {
                        attempt,
                        cause: error,
                    })
                }
            }
        }
        .instrument(info_span!("submit_report"))
        .await
    }

    /// 单次提交
    async fn attempt(
        &self,
        site: &VerifiedSite,
        report_type: &str,
        body: &Value,
        attempt: u32,
    ) -> Result<ReportHandle, Attempt<RequestFailure>> {
        debug!("第 {} 次提交报表请求", attempt);

        let response = self
            .api
            .create_report(site, report_type, body)
            .await
            .map_err(|e| Attempt::Retry(RequestFailure::from(e)))?;

        classify_submission(&response)
    }
}

/// 判断提交响应
///
/// - 非 2xx 或无法解析：重试
/// - status 为 FAILED：重试
/// - 其余情况视为成功，必须带有报表ID
fn classify_submission(response: &ApiResponse) -> Result<ReportHandle, Attempt<RequestFailure>> {
    if !response.is_success() {
        return Err(Attempt::Retry(RequestFailure::HttpStatus {
            url: response.url.clone(),
            status: response.status,
            snippet: truncate_text(&response.body, SNIPPET_LEN),
        }));
    }

    let value: Value = serde_json::from_str(&response.body).map_err(|e| {
        Attempt::Retry(RequestFailure::Undecodable {
            url: response.url.clone(),
            message: e.to_string(),
        })
    })?;

    let handle = ReportHandle::from_body(&value);
    match ReportStatus::from_json(value) {
        ReportStatus::Failed(reason) => Err(Attempt::Retry(RequestFailure::ReportFailed { reason })),
        ReportStatus::Processing(_) | ReportStatus::Ready(_) => handle.ok_or_else(|| {
            Attempt::Abort(RequestFailure::MissingReportId {
                snippet: truncate_text(&response.body, SNIPPET_LEN),
            })
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse::new("https://api.example.com/x", status, body)
    }

    #[test]
    fn test_body_without_status_is_success() {
        assert_eq!(
            classify_submission(&response(200, r#"{"id":"abc"}"#)),
            Ok(ReportHandle::new("abc"))
        );
    }

    #[test]
    fn test_pending_status_is_success() {
        assert_eq!(
            classify_submission(&response(202, r#"{"id":"abc","status":"PENDING"}"#)),
            Ok(ReportHandle::new("abc"))
        );
    }

    #[test]
    fn test_failed_status_is_retried() {
        assert!(matches!(
            classify_submission(&response(200, r#"{"id":"abc","status":"FAILED"}"#)),
            Err(Attempt::Retry(RequestFailure::ReportFailed { .. }))
        ));
    }

    #[test]
    fn test_http_error_is_retried() {
        assert!(matches!(
            classify_submission(&response(503, "Service Unavailable")),
            Err(Attempt::Retry(RequestFailure::HttpStatus { status: 503, .. }))
        ));
    }

    #[test]
    fn test_missing_id_aborts() {
        assert!(matches!(
            classify_submission(&response(200, r#"{"accepted":true}"#)),
            Err(Attempt::Abort(RequestFailure::MissingReportId { .. }))
        ));
    }
}
