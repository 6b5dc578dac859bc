// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::engines::driver::RenderingDriver;
use crate::engines::traits::{BrowserEngine, EngineError};
use crate::utils::retry::RetryExecutor;
use crate::utils::retry_policy::RetryPolicy;
use crate::utils::text_processing::sanitize_xml;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// 引擎路由器
///
/// 按固定顺序尝试各个浏览器引擎：每个引擎独立启动、独立重试，
/// 前一个引擎彻底失败后才切换到下一个。
pub struct EngineRouter {
    /// 引擎列表（按优先级排序）
    engines: Vec<Arc<dyn BrowserEngine>>,
    settings: Arc<Settings>,
    executor: RetryExecutor,
}

impl EngineRouter {
    /// 创建新的引擎路由器
    ///
    /// # 参数
    ///
    /// * `engines` - 引擎列表，第一个为主引擎
    /// * `settings` - 应用配置
    pub fn new(engines: Vec<Arc<dyn BrowserEngine>>, settings: Arc<Settings>) -> Self {
        let executor = RetryExecutor::new(RetryPolicy::from(&settings.retry));
        Self::with_executor(engines, settings, executor)
    }

    /// 使用指定重试执行器创建引擎路由器
    pub fn with_executor(
        engines: Vec<Arc<dyn BrowserEngine>>,
        settings: Arc<Settings>,
        executor: RetryExecutor,
    ) -> Self {
        Self {
            engines,
            settings,
            executor,
        }
    }

    /// 获取清洗后的RSS内容
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 已去除非法控制字符的XML
    /// * `Err(EngineError)` - 最后一个引擎的失败原因
    pub async fn acquire(&self) -> Result<String, EngineError> {
        let url = self.settings.fetch.target_url.as_str();
        let start_time = Instant::now();
        let mut last_error = None;

        let mut engines = self.engines.iter().peekable();
        while let Some(engine) = engines.next() {
            let engine_name = engine.name();
            info!("Fetching {} with {}...", url, engine_name);

            match self.acquire_with(engine.as_ref()).await {
                Ok(xml) => {
                    info!(
                        "Engine {} succeeded, total time: {:?}",
                        engine_name,
                        start_time.elapsed()
                    );
                    return Ok(sanitize_xml(&xml));
                }
                Err(e) if !e.is_engine_failure() => {
                    error!("{} failed with non-recoverable error: {}", engine_name, e);
                    return Err(e);
                }
                Err(e) => {
                    if let Some(next) = engines.peek() {
                        error!("{} failed, falling back to {}: {}", engine_name, next.name(), e);
                    } else {
                        error!("{} failed: {}", engine_name, e);
                    }
                    last_error = Some(e);
                }
            }
        }

        error!("All engines failed for request to {}", url);
        Err(last_error.unwrap_or(EngineError::AllEnginesFailed))
    }

    /// 在单个引擎上完成启动、重试抓取和关闭
    async fn acquire_with(&self, engine: &dyn BrowserEngine) -> Result<String, EngineError> {
        // Launch failures skip the retry loop and go straight to the next engine
        let session = engine.launch(&self.settings.browser).await?;

        let driver = RenderingDriver::new(
            self.settings.fetch.target_url.clone(),
            &self.settings.page,
            engine.network_idle(),
        );
        let driver = &driver;
        let session_ref = session.as_ref();

        let outcome = self
            .executor
            .execute(engine.name(), move |_| driver.fetch_feed(session_ref))
            .await
            .map_err(EngineError::from);

        if let Err(e) = session.shutdown().await {
            warn!("Failed to shut down {}: {}", engine.name(), e);
        }

        outcome
    }
}
