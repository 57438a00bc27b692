//! 重试执行器 - 基础设施层
//!
//! 只提供"有限次数 + 指数退避"的重试能力，不认识任何业务错误：
//! 每次尝试是否值得重试，由调用方通过 [`Attempt`] 明确告知

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// 重试策略
///
/// 提交和轮询各自持有一份独立的策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 首次尝试之外的最大重试次数
    pub retries: u32,
    /// 第一次重试前的等待时间（毫秒）
    pub min_timeout_ms: u64,
    /// 单次等待的上限（毫秒）
    pub max_timeout_ms: u64,
    /// 指数因子
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 10,
            min_timeout_ms: 1000,
            max_timeout_ms: u64::MAX,
            factor: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, min_timeout: Duration, max_timeout: Duration) -> Self {
        Self {
            retries,
            min_timeout_ms: saturating_millis(min_timeout),
            max_timeout_ms: saturating_millis(max_timeout),
            factor: 2,
        }
    }

    /// 最多调用次数（首次 + 重试）
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// 第 `retry` 次重试之前的等待时间（从 1 开始）
    ///
    /// `min(min_timeout * factor^(retry-1), max_timeout)`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        let multiplier = u64::from(self.factor.max(1)).saturating_pow(exponent);
        let millis = self
            .min_timeout_ms
            .saturating_mul(multiplier)
            .min(self.max_timeout_ms);
        Duration::from_millis(millis)
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// 单次尝试的失败结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<E> {
    /// 值得重试
    Retry(E),
    /// 不可重试，立即结束
    Abort(E),
}

/// 重试执行器的最终失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// 所有尝试都失败了
    Exhausted { attempts: u32, last: E },
    /// 某次尝试返回了不可重试的错误
    Aborted { attempt: u32, error: E },
}

/// 带指数退避的重试
///
/// `op` 接收从 1 开始的尝试序号。最多调用 `policy.retries + 1` 次，
/// 第一次成功立即返回，不产生任何等待。
///
/// # 参数
/// - `policy`: 重试策略
/// - `label`: 日志标签
/// - `op`: 单次尝试
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
    E: Display,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                debug!("[{}] 第 {}/{} 次尝试成功", label, attempt, max_attempts);
                return Ok(value);
            }
            Err(Attempt::Abort(e)) => {
                error!(
                    "[{}] 第 {}/{} 次尝试遇到不可重试错误: {}",
                    label, attempt, max_attempts, e
                );
                return Err(RetryError::Aborted { attempt, error: e });
            }
            Err(Attempt::Retry(e)) => {
                if attempt >= max_attempts {
                    error!(
                        "[{}] 已达到最大尝试次数 {}，最后一次错误: {}",
                        label, max_attempts, e
                    );
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: e,
                    });
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    "[{}] 第 {}/{} 次尝试失败: {}，{}ms 后重试...",
                    label,
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
