// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::retry_policy::RetryPolicy;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// 重试耗尽错误
///
/// 携带操作名称、实际尝试次数以及最后一次失败的错误。
#[derive(Error, Debug)]
#[error("{name} failed after {attempts} attempt(s): {source}")]
pub struct RetryError<E> {
    /// 操作名称
    pub name: String,
    /// 实际尝试次数
    pub attempts: u32,
    /// 最后一次失败的错误
    #[source]
    pub source: E,
}

/// 重试执行器
///
/// 按照 [`RetryPolicy`] 反复执行可失败的异步操作，失败之间按退避策略休眠。
pub struct RetryExecutor {
    policy: RetryPolicy,
    rng: Mutex<StdRng>,
}

impl RetryExecutor {
    /// 创建使用系统熵初始化随机源的执行器
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_rng(policy, StdRng::from_os_rng())
    }

    /// 使用指定随机源创建执行器（测试中用于获得确定的抖动）
    pub fn with_rng(policy: RetryPolicy, rng: StdRng) -> Self {
        Self {
            policy,
            rng: Mutex::new(rng),
        }
    }

    fn next_delay(&self, attempt: u32) -> Duration {
        let mut rng = self.rng.lock();
        self.policy.calculate_backoff_with(attempt, &mut *rng)
    }

    /// 执行操作直到成功或尝试次数耗尽
    ///
    /// `operation` 接收从1开始的尝试序号。共最多调用 `max_retries` 次
    /// （`max_retries` 为0时按1处理）。全部失败时返回最后一次的错误。
    pub async fn execute<T, E, F, Fut>(&self, name: &str, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.policy.max_retries.max(1);
        let mut attempt = 1;

        loop {
            let error = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            warn!("{} attempt {}/{} failed: {}", name, attempt, max_attempts, error);

            if !self.policy.should_retry(attempt) {
                return Err(RetryError {
                    name: name.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }

            let delay = self.next_delay(attempt);
            info!(
                "Retrying {} in {:.1}s (at {})...",
                name,
                delay.as_secs_f64(),
                self.policy.next_retry_time(delay, Utc::now()).to_rfc3339()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
