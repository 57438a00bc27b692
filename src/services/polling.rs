//! 报表轮询服务 - 业务能力层
//!
//! 只负责"等报表就绪并取回内容"：响应里只要还有 status 字段就继续等

use crate::clients::{ApiResponse, ReportApi};
use crate::error::{PollingError, RequestFailure};
use crate::infrastructure::{retry_with_backoff, Attempt, RetryError, RetryPolicy};
use crate::models::{OutputFormat, ReportHandle, ReportPayload, ReportStatus, VerifiedSite};
use crate::utils::truncate_text;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};

const SNIPPET_LEN: usize = 200;

/// 报表轮询服务
pub struct ReportPoller {
    api: Arc<dyn ReportApi>,
    policy: RetryPolicy,
}

impl ReportPoller {
    pub fn new(api: Arc<dyn ReportApi>, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    /// 轮询直到报表就绪
    ///
    /// # 参数
    /// - `site`: 已校验的站点信息
    /// - `handle`: 提交时拿到的报表ID
    /// - `format`: 请求的输出格式，决定如何解读响应内容
    ///
    /// # 返回
    /// 返回报表内容；重试耗尽后按最后一次看到的状态返回 `ReportFailed` 或 `TimedOut`
    pub async fn poll(
        &self,
        site: &VerifiedSite,
        handle: &ReportHandle,
        format: &OutputFormat,
    ) -> Result<ReportPayload, PollingError> {
        async {
            let result = retry_with_backoff(&self.policy, "poll_for_report", move |attempt| {
                self.attempt(site, handle, format, attempt)
            })
            .await;

            match result {
                Ok(payload) => {
                    match payload.record_count() {
                        Some(count) => info!("✓ 报表已取回，记录数: {}", count),
                        None => info!("✓ 报表已取回"),
                    }
                    Ok(payload)
                }
                Err(RetryError::Exhausted { attempts, last }) => {
                    error!("❌ 报表获取失败 (已轮询 {} 次)", attempts);
                    Err(match last {
                        RequestFailure::ReportFailed { reason } => {
                            PollingError::ReportFailed { attempts, reason }
                        }
                        other => PollingError::TimedOut {
                            attempts,
                            last: other,
                        },
                    })
                }
                Err(RetryError::Aborted { attempt, error }) => {
                    error!("❌ 报表获取失败 (第 {} 次轮询)", attempt);
                    Err(PollingError::Rejected {
                        attempt,
                        cause: error,
                    })
                }
            }
        }
        .instrument(info_span!("poll_for_report", report_id = %handle))
        .await
    }

    /// 单次查询
    async fn attempt(
        &self,
        site: &VerifiedSite,
        handle: &ReportHandle,
        format: &OutputFormat,
        attempt: u32,
    ) -> Result<ReportPayload, Attempt<RequestFailure>> {
        debug!("第 {} 次查询报表状态", attempt);

        let response = self
            .api
            .get_report(site, handle.as_str())
            .await
            .map_err(|e| Attempt::Retry(RequestFailure::from(e)))?;

        classify_poll(&response, handle, format)
    }
}

/// 判断轮询响应
///
/// 处理中和失败都重试，直到策略耗尽
fn classify_poll(
    response: &ApiResponse,
    handle: &ReportHandle,
    format: &OutputFormat,
) -> Result<ReportPayload, Attempt<RequestFailure>> {
    if !response.is_success() {
        return Err(Attempt::Retry(RequestFailure::HttpStatus {
            url: response.url.clone(),
            status: response.status,
            snippet: truncate_text(&response.body, SNIPPET_LEN),
        }));
    }

    let status = ReportStatus::from_body(&response.body, format).map_err(|e| {
        Attempt::Retry(RequestFailure::Undecodable {
            url: response.url.clone(),
            message: e.to_string(),
        })
    })?;

    match status {
        ReportStatus::Ready(payload) => Ok(payload),
        ReportStatus::Processing(status) => Err(Attempt::Retry(RequestFailure::NotReady {
            report_id: handle.to_string(),
            status,
        })),
        ReportStatus::Failed(reason) => {
            Err(Attempt::Retry(RequestFailure::ReportFailed { reason }))
        }
    }
}
