// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::RetrySettings;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含第一次）
    pub max_retries: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_millis(settings.initial_delay_ms),
            max_backoff: Duration::from_millis(settings.max_delay_ms),
            backoff_multiplier: settings.multiplier,
            jitter_factor: settings.jitter_factor,
        }
    }
}

impl RetryPolicy {
    /// 计算第 `attempt` 次尝试失败后的退避时间
    ///
    /// `attempt` 从1开始计数。使用线程本地随机数生成抖动。
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        self.calculate_backoff_with(attempt, &mut rand::rng())
    }

    /// 使用指定随机源计算退避时间
    ///
    /// `base = initial * multiplier^(attempt-1)`，上限为 `max_backoff`，
    /// 再叠加 `±jitter_factor` 比例的均匀抖动，按毫秒四舍五入且不小于0。
    pub fn calculate_backoff_with<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_ms =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);

        // 限制最大退避时间
        let capped_ms = base_ms.min(self.max_backoff.as_millis() as f64);

        let jitter_ms = if self.jitter_factor > 0.0 {
            capped_ms * self.jitter_factor * rng.random_range(-1.0..=1.0)
        } else {
            0.0
        };

        let delay_ms = (capped_ms + jitter_ms).round().max(0.0);
        Duration::from_millis(delay_ms as u64)
    }

    /// 计算下次重试时间
    pub fn next_retry_time(&self, delay: Duration, base_time: DateTime<Utc>) -> DateTime<Utc> {
        base_time + chrono::Duration::milliseconds(delay.as_millis() as i64)
    }

    /// 是否应该重试
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}
