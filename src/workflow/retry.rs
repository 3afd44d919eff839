//! 阶段内部的有限次重试

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::StageError;
use crate::models::Stage;
use crate::utils::logging::truncate_text;

/// 固定次数、固定间隔的重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（含第一次），至少为 1
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// 执行 `op`，任何错误都在本地重试，耗尽后返回最后一次的错误
///
/// `op` 收到从 1 开始的尝试序号；最后一次失败后不再等待
pub async fn with_retry<T, F, Fut>(
    stage: Stage,
    policy: RetryPolicy,
    mut op: F,
) -> Result<T, StageError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, StageError>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("[{}] 第 {} 次尝试成功", stage, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.max_attempts => {
                warn!(
                    "[{}] 尝试 {}/{} 失败: {}，{} ms 后重试...",
                    stage,
                    attempt,
                    policy.max_attempts,
                    truncate_text(&e.to_string(), 200),
                    policy.delay.as_millis()
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!("[{}] 已重试 {} 次仍失败: {}", stage, policy.max_attempts, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(Stage::Parse, instant(3), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(StageError::Generation("timeout".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error_after_exhaustion() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(Stage::Blocks, instant(2), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(StageError::LowQuality(format!("attempt {attempt}"))) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(result, Err(StageError::LowQuality(msg)) if msg == "attempt 2"));
    }

    #[test]
    fn test_policy_needs_at_least_one_attempt() {
        assert_eq!(instant(0).max_attempts, 1);
        let config = Config {
            max_retries: 5,
            retry_delay_ms: 10,
            ..Config::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(10));
    }

    #[test]
    fn test_single_attempt_does_not_sleep() {
        let policy = RetryPolicy::new(1, Duration::from_secs(3600));
        let result: Result<(), _> = tokio_test::block_on(with_retry(Stage::Parse, policy, |_| {
            async { Err(StageError::Generation("down".to_string())) }
        }));
        assert!(result.is_err());
    }
}
