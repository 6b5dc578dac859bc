// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod scripted_engine;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rssgrab::config::settings::Settings;
use rssgrab::engines::router::EngineRouter;
use rssgrab::engines::traits::BrowserEngine;
use rssgrab::utils::retry::RetryExecutor;
use rssgrab::utils::retry_policy::RetryPolicy;
use std::path::Path;
use std::sync::Arc;

pub const TEST_FEED_URL: &str = "https://feeds.example.com/issue/latest/feed";

/// 测试用配置：3次尝试，100ms起始退避，无抖动，10ms稳定等待
pub fn test_settings(output_path: &Path) -> Arc<Settings> {
    let builder = Settings::builder()
        .unwrap()
        .set_override("fetch.target_url", TEST_FEED_URL)
        .unwrap()
        .set_override("fetch.output_path", output_path.to_string_lossy().to_string())
        .unwrap()
        .set_override("retry.max_retries", 3)
        .unwrap()
        .set_override("retry.initial_delay_ms", 100)
        .unwrap()
        .set_override("retry.max_delay_ms", 1000)
        .unwrap()
        .set_override("retry.jitter_factor", 0.0)
        .unwrap()
        .set_override("page.post_load_wait_ms", 10)
        .unwrap();

    Arc::new(Settings::from_builder(builder).unwrap())
}

/// 使用固定随机种子的路由器
pub fn test_router(engines: Vec<Arc<dyn BrowserEngine>>, settings: Arc<Settings>) -> EngineRouter {
    let executor = RetryExecutor::with_rng(
        RetryPolicy::from(&settings.retry),
        StdRng::seed_from_u64(42),
    );
    EngineRouter::with_executor(engines, settings, executor)
}
