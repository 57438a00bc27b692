//! 基础设施层（Infrastructure）
//!
//! 只暴露能力，不认识报表业务

pub mod proxy;
pub mod retry;

pub use proxy::{detect_debug_proxy, ProxyEndpoint};
pub use retry::{retry_with_backoff, Attempt, RetryError, RetryPolicy};
