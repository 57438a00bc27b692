//! 流程状态
//!
//! Idle → Submitting → Polling → Writing → Done，任一阶段失败进入 Aborted

use crate::error::AppError;
use std::fmt::Display;
use std::path::PathBuf;

/// 流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// 未开始
    Idle,
    /// 正在提交报表请求
    Submitting,
    /// 正在轮询报表
    Polling,
    /// 正在写入输出文件
    Writing,
    /// 完成
    Done,
    /// 中止
    Aborted,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Aborted)
    }

    /// 检查状态转换是否合法
    pub fn can_advance_to(self, next: WorkflowState) -> bool {
        use WorkflowState::*;
        match (self, next) {
            (Idle, Submitting) | (Submitting, Polling) | (Polling, Writing) | (Writing, Done) => {
                true
            }
            (current, Aborted) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::Submitting => "Submitting",
            WorkflowState::Polling => "Polling",
            WorkflowState::Writing => "Writing",
            WorkflowState::Done => "Done",
            WorkflowState::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

/// 一次运行的结果
#[derive(Debug)]
pub struct FlowOutcome {
    /// 最终状态（Done 或 Aborted）
    pub state: WorkflowState,
    /// 中止前所处的阶段
    pub failed_in: Option<WorkflowState>,
    /// 中止原因
    pub error: Option<AppError>,
    /// 成功时写入的文件
    pub output: Option<PathBuf>,
}

impl FlowOutcome {
    pub fn done(output: PathBuf) -> Self {
        Self {
            state: WorkflowState::Done,
            failed_in: None,
            error: None,
            output: Some(output),
        }
    }

    pub fn aborted(failed_in: WorkflowState, error: AppError) -> Self {
        Self {
            state: WorkflowState::Aborted,
            failed_in: Some(failed_in),
            error: Some(error),
            output: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == WorkflowState::Done
    }

    pub fn failed_in_label(&self) -> String {
        self.failed_in
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}
