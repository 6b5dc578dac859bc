// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::idle::{LifecycleWatch, NetworkIdle};
use crate::engines::traits::{
    parse_text_content, text_content_script, BrowserEngine, BrowserPage, BrowserSession,
    EngineError,
};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

const ENGINE_NAME: &str = "chromiumoxide";

/// CDP引擎
///
/// 基于chromiumoxide直接驱动Chrome DevTools协议，作为主引擎使用。
/// 导航完成条件为 `networkAlmostIdle`。
pub struct CdpEngine;

#[async_trait]
impl BrowserEngine for CdpEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn network_idle(&self) -> NetworkIdle {
        NetworkIdle::AlmostIdle
    }

    /// 启动Chrome，或在配置了远程调试地址时连接已有实例
    async fn launch(
        &self,
        settings: &BrowserSettings,
    ) -> Result<Box<dyn BrowserSession>, EngineError> {
        let launch_error = |message: String| EngineError::Launch {
            engine: ENGINE_NAME,
            message,
        };

        let remote_debugging_url = settings
            .remote_debugging_url
            .as_deref()
            .filter(|url| !url.is_empty());

        let (browser, mut handler) = if let Some(url) = remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url)
                .await
                .map_err(|e| launch_error(format!("Failed to connect to remote Chrome: {}", e)))?
        } else {
            let mut builder = BrowserConfig::builder()
                .request_timeout(settings.request_timeout())
                .args(settings.args.clone());

            if !settings.headless {
                builder = builder.with_head();
            }
            if let Some(path) = settings.chrome_executable_path() {
                builder = builder.chrome_executable(path);
            }

            Browser::launch(builder.build().map_err(launch_error)?)
                .await
                .map_err(|e| launch_error(e.to_string()))?
        };

        // Spawn a handler to process browser events
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        Ok(Box::new(CdpSession {
            browser,
            handler_task,
            user_agent: settings.user_agent.clone(),
            owned: remote_debugging_url.is_none(),
        }))
    }
}

/// chromiumoxide浏览器实例
pub struct CdpSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    user_agent: String,
    // Remote browsers are left running on shutdown.
    owned: bool,
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, EngineError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(EngineError::page)?;

        if let Err(e) = page.set_user_agent(self.user_agent.as_str()).await {
            let _ = page.close().await;
            return Err(EngineError::page(e));
        }

        Ok(Box::new(CdpPage { page }))
    }

    async fn shutdown(self: Box<Self>) -> Result<(), EngineError> {
        let CdpSession {
            mut browser,
            handler_task,
            owned,
            ..
        } = *self;

        // Dropping a launched Browser kills the child process if close fails.
        let outcome = if owned {
            match browser.close().await {
                Ok(_) => browser.wait().await.map(|_| ()).map_err(EngineError::page),
                Err(e) => Err(EngineError::page(e)),
            }
        } else {
            Ok(())
        };

        drop(browser);
        handler_task.abort();
        outcome
    }
}

/// chromiumoxide标签页
pub struct CdpPage {
    page: Page,
}

#[async_trait]
impl BrowserPage for CdpPage {
    async fn navigate(
        &mut self,
        url: &str,
        idle: NetworkIdle,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        // Subscribe before navigating so the new document's `init` is not missed
        let mut events = self
            .page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(EngineError::page)?;
        let page = &self.page;

        let navigation = async {
            page.goto(url)
                .await
                .map_err(|e| EngineError::navigation(url, e))?;

            let main_frame = page.mainframe().await.map_err(EngineError::page)?;
            let mut watch = LifecycleWatch::new(idle);

            while let Some(event) = events.next().await {
                if main_frame
                    .as_ref()
                    .is_some_and(|frame| *frame != event.frame_id)
                {
                    continue;
                }
                if watch.observe(&event.name) {
                    tracing::debug!(
                        "{} reached {} (<= {} connections for {:?})",
                        url,
                        idle.lifecycle_event(),
                        idle.max_inflight(),
                        idle.quiet_period()
                    );
                    return Ok(());
                }
            }

            Err(EngineError::navigation(
                url,
                "lifecycle event stream ended before the network became idle",
            ))
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| EngineError::timeout(url, timeout))?
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, EngineError> {
        let raw: String = self
            .page
            .evaluate(text_content_script(selector))
            .await
            .map_err(EngineError::page)?
            .into_value()
            .map_err(EngineError::page)?;
        parse_text_content(&raw)
    }

    async fn content(&self) -> Result<String, EngineError> {
        self.page.content().await.map_err(EngineError::page)
    }

    async fn url(&self) -> Result<String, EngineError> {
        Ok(self
            .page
            .url()
            .await
            .map_err(EngineError::page)?
            .unwrap_or_default())
    }

    async fn title(&self) -> Result<String, EngineError> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(EngineError::page)?
            .unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<(), EngineError> {
        let CdpPage { page } = *self;
        page.close().await.map_err(EngineError::page)
    }
}
