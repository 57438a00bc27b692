//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 管理一次运行的生命周期：准备 HTTP 客户端和输出目标，执行报表流程，输出结果。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (一次运行)
//!     ↓
//! workflow::ReportFlow (submit → poll → write)
//!     ↓
//! services (能力层：提交 / 轮询 / 写文件)
//!     ↓
//! clients + infrastructure (HTTP、重试、代理)
//! ```

pub mod app;

pub use app::App;
