//! 重试策略：两个工具适配器共用
//!
//! 最多 max_attempts 次尝试；第 k 次失败后等待 base_delay * k 再重试（线性退避）。
//! 只有 Transient 错误会被重试；Fatal 错误立即返回。重试调度由 backoff crate 驱动。

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::backoff::Backoff;

use crate::config::RetrySection;
use crate::core::ToolExecutionError;
use crate::plan::ToolKind;

/// 单次尝试的失败分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// 超时、连接错误、非 2xx 响应
    Transient(String),
    /// 响应无法解析等，重试无益
    Fatal(String),
}

impl AttemptError {
    fn into_backoff(self) -> backoff::Error<AttemptError> {
        match self {
            AttemptError::Transient(_) => backoff::Error::transient(self),
            AttemptError::Fatal(_) => backoff::Error::permanent(self),
        }
    }
}

/// 线性退避：第 k 次失败后等待 base * k；失败满 max_attempts 次返回 None
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base: Duration,
    max_attempts: u32,
    failures: u32,
}

impl LinearBackoff {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max_attempts: max_attempts.max(1),
            failures: 0,
        }
    }
}

impl Backoff for LinearBackoff {
    fn reset(&mut self) {
        self.failures = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures >= self.max_attempts {
            return None;
        }
        Some(self.base * self.failures)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// max_attempts 至少为 1
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &RetrySection) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.base_delay_ms))
    }

    pub fn backoff(&self) -> LinearBackoff {
        LinearBackoff::new(self.base_delay, self.max_attempts)
    }

    /// 执行 op，op 收到当前尝试序号（从 1 开始）
    pub async fn run<T, F, Fut>(&self, tool: ToolKind, mut op: F) -> Result<T, ToolExecutionError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let attempts = AtomicU32::new(0);
        let outcome = backoff::future::retry_notify(
            self.backoff(),
            || {
                let attempt = op(attempts.fetch_add(1, Ordering::SeqCst) + 1);
                async move { attempt.await.map_err(AttemptError::into_backoff) }
            },
            |error: AttemptError, delay: Duration| {
                tracing::warn!(
                    tool = %tool,
                    attempt = attempts.load(Ordering::SeqCst),
                    max_attempts = self.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = ?error,
                    "tool attempt failed, retrying"
                );
            },
        )
        .await;

        let attempts = attempts.load(Ordering::SeqCst);
        outcome.map_err(|error| match error {
            AttemptError::Fatal(message) => ToolExecutionError::Upstream {
                tool,
                attempts,
                message,
            },
            AttemptError::Transient(last_error) => ToolExecutionError::RetriesExhausted {
                tool,
                attempts,
                last_error,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[test]
    fn test_linear_delays() {
        let mut backoff = RetryPolicy::default().backoff();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(2)));
        assert_eq!(backoff.next_backoff(), None);

        backoff.reset();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_at_least_one_attempt() {
        let mut backoff = RetryPolicy::new(0, Duration::ZERO).backoff();
        assert_eq!(backoff.next_backoff(), None);
    }

    #[tokio::test]
    async fn test_single_attempt_policy_does_not_retry() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryPolicy::new(1, Duration::from_millis(1))
            .run(ToolKind::Weather, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AttemptError::Transient("HTTP 503".to_string())) }
            })
            .await;

        assert!(matches!(
            result,
            Err(ToolExecutionError::RetriesExhausted { attempts: 1, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = fast_policy()
            .run(ToolKind::Github, |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(AttemptError::Transient("HTTP 502 Bad Gateway".to_string()))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy()
            .run(ToolKind::Github, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AttemptError::Transient("HTTP 500 Internal Server Error".to_string())) }
            })
            .await;

        assert_eq!(
            result,
            Err(ToolExecutionError::RetriesExhausted {
                tool: ToolKind::Github,
                attempts: 3,
                last_error: "HTTP 500 Internal Server Error".to_string(),
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy()
            .run(ToolKind::Weather, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AttemptError::Fatal("invalid response body".to_string())) }
            })
            .await;

        assert!(matches!(
            result,
            Err(ToolExecutionError::Upstream { attempts: 1, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
