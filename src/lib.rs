//! # Report Fetch
//!
//! 从报表 API 提交报表请求、轮询生成结果并保存到本地文件的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/retry` - 有限次数 + 指数退避的通用重试执行器
//! - `infrastructure/proxy` - 调试代理探测
//! - `clients/` - `ReportApi` 接口与基于 reqwest 的 `ReportClient`
//!
//! ### ② 业务能力层（Services）
//! - `ReportSubmitter` - 提交报表请求，拿到报表ID
//! - `ReportPoller` - 轮询直到报表就绪
//! - `OutputWriter` - 完整覆盖写入输出文件
//!
//! ### ③ 流程层（Workflow）
//! - `ReportFlow` - 流程编排（校验 → 提交 → 轮询 → 写文件）
//! - `WorkflowState` - 流程状态
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用生命周期，组装客户端并运行流程
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ApiResponse, ReportApi, ReportClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{Attempt, RetryPolicy};
pub use models::{ReportHandle, ReportPayload, ReportRequestSpec, ReportStatus, SiteCredentials};
pub use orchestrator::App;
pub use workflow::{FlowOutcome, ReportFlow, WorkflowState};
