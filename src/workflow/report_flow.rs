//! 报表处理流程 - 流程层
//!
//! 核心职责：定义"一份报表"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验配置（缺少凭据直接中止，不发请求）
//! 2. 提交报表请求 → 报表ID
//! 3. 轮询报表 → 报表内容
//! 4. 写入输出文件（完整覆盖）
//!
//! 重试只发生在提交和轮询各自内部，阶段之间不重试

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};

use crate::clients::ReportApi;
use crate::config::Config;
use crate::error::{AppResult, ConfigError, OutputError};
use crate::models::{OutputFormat, ReportPayload, ReportRequestSpec, SiteCredentials};
use crate::services::{OutputSink, ReportPoller, ReportSubmitter};
use crate::workflow::flow_state::{FlowOutcome, WorkflowState};

/// 报表处理流程
///
/// - 按顺序推进状态
/// - 不持有 HTTP 客户端的具体实现，只依赖 `ReportApi`
pub struct ReportFlow {
    credentials: SiteCredentials,
    request: Result<ReportRequestSpec, ConfigError>,
    destination: Result<PathBuf, ConfigError>,
    submitter: ReportSubmitter,
    poller: ReportPoller,
    sink: Arc<dyn OutputSink>,
}

impl ReportFlow {
    /// 创建新的报表处理流程
    ///
    /// 配置中的错误在 `run` 时才报告，这样流程总能以 Aborted 结束
    pub fn new(config: &Config, api: Arc<dyn ReportApi>, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            credentials: config.site.clone(),
            request: config.report.to_spec(),
            destination: config.output.destination(),
            submitter: ReportSubmitter::new(api.clone(), config.retry_options.clone()),
            poller: ReportPoller::new(api, config.polling_options.clone()),
            sink,
        }
    }

    /// 执行完整流程
    pub async fn run(&self) -> FlowOutcome {
        let mut state = WorkflowState::Idle;

        let result = self.execute(&mut state).instrument(info_span!("main")).await;

        match result {
            Ok(path) => {
                advance(&mut state, WorkflowState::Done);
                FlowOutcome::done(path)
            }
            Err(e) => {
                let failed_in = state;
                error!("❌ 流程在 {} 阶段中止: {}", failed_in, e);
                advance(&mut state, WorkflowState::Aborted);
                FlowOutcome::aborted(failed_in, e)
            }
        }
    }

    async fn execute(&self, state: &mut WorkflowState) -> AppResult<PathBuf> {
        // ========== Idle: 校验 ==========
        let site = self.credentials.validate()?;
        let spec = self.request.clone()?;
        let destination = self.destination.clone()?;
        let format = spec.format();

        // ========== Submitting ==========
        advance(state, WorkflowState::Submitting);
        let handle = self.submitter.submit(&spec, &site).await?;
        info!("报表ID: {}", handle);

        // ========== Polling ==========
        advance(state, WorkflowState::Polling);
        let payload = self.poller.poll(&site, &handle, &format).await?;

        // ========== Writing ==========
        advance(state, WorkflowState::Writing);
        self.write_output(&destination, &format, payload).await?;

        Ok(destination)
    }

    /// 写入输出文件
    async fn write_output(
        &self,
        destination: &Path,
        format: &OutputFormat,
        payload: ReportPayload,
    ) -> AppResult<()> {
        let structured = format.is_structured();
        let contents = payload.into_bytes().map_err(OutputError::from)?;

        self.sink.replace(destination, &contents).await?;

        if structured {
            info!("✓ JSON 已写入 {}", destination.display());
        } else {
            info!("✓ 报表内容已写入 {}", destination.display());
        }
        Ok(())
    }
}

fn advance(state: &mut WorkflowState, next: WorkflowState) {
    debug_assert!(
        state.can_advance_to(next),
        "非法状态转换: {} -> {}",
        state,
        next
    );
    debug!("状态: {} → {}", state, next);
    *state = next;
}
