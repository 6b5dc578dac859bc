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
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

const ENGINE_NAME: &str = "headless_chrome";

/// headless_chrome引擎
///
/// 主引擎不可用时的备用引擎。headless_chrome是同步API，
/// 所有调用都放在 `spawn_blocking` 中执行。导航完成条件为 `networkIdle`。
pub struct HeadlessChromeEngine;

/// 计算截止时间前剩余的等待预算
///
/// 预算已经用完时返回超时错误
fn remaining_budget(
    deadline: Instant,
    now: Instant,
    url: &str,
    timeout: Duration,
) -> Result<Duration, EngineError> {
    let remaining = deadline.saturating_duration_since(now);
    if remaining.is_zero() {
        return Err(EngineError::timeout(url, timeout));
    }
    Ok(remaining)
}

// Runs a blocking headless_chrome call off the async runtime.
async fn blocking<T, F>(task: F) -> Result<T, EngineError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| EngineError::page(format!("blocking task failed: {}", e)))?
}

#[async_trait]
impl BrowserEngine for HeadlessChromeEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn network_idle(&self) -> NetworkIdle {
        NetworkIdle::Idle
    }

    async fn launch(
        &self,
        settings: &BrowserSettings,
    ) -> Result<Box<dyn BrowserSession>, EngineError> {
        let settings = settings.clone();
        let user_agent = settings.user_agent.clone();

        let browser = blocking(move || {
            let launch_error = |message: String| EngineError::Launch {
                engine: ENGINE_NAME,
                message,
            };

            let args: Vec<&OsStr> = settings.args.iter().map(OsStr::new).collect();
            let options = LaunchOptions::default_builder()
                .headless(settings.headless)
                .path(settings.chrome_executable_path())
                .args(args)
                .idle_browser_timeout(settings.idle_timeout())
                .build()
                .map_err(|e| launch_error(e.to_string()))?;

            Browser::new(options).map_err(|e| launch_error(format!("{:#}", e)))
        })
        .await?;

        Ok(Box::new(HeadlessChromeSession {
            browser: Arc::new(browser),
            user_agent,
        }))
    }
}

/// headless_chrome浏览器实例
pub struct HeadlessChromeSession {
    browser: Arc<Browser>,
    user_agent: String,
}

#[async_trait]
impl BrowserSession for HeadlessChromeSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, EngineError> {
        let browser = Arc::clone(&self.browser);
        let user_agent = self.user_agent.clone();

        let tab = blocking(move || {
            let tab = browser.new_tab().map_err(|e| EngineError::page(format!("{:#}", e)))?;
            if let Err(e) = tab.set_user_agent(&user_agent, None, None) {
                let _ = tab.close(false);
                return Err(EngineError::page(format!("{:#}", e)));
            }
            Ok(tab)
        })
        .await?;

        Ok(Box::new(HeadlessChromePage { tab }))
    }

    async fn shutdown(self: Box<Self>) -> Result<(), EngineError> {
        let browser = self.browser;
        // Dropping the last handle terminates the Chrome process.
        blocking(move || {
            drop(browser);
            Ok(())
        })
        .await
    }
}

/// headless_chrome标签页
pub struct HeadlessChromePage {
    tab: Arc<Tab>,
}

impl HeadlessChromePage {
    fn navigate_blocking(
        tab: &Tab,
        url: &str,
        idle: NetworkIdle,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        let deadline = Instant::now() + timeout;
        let main_frame = tab.get_target_id().clone();
        let (sender, receiver) = mpsc::channel::<String>();

        tab.call_method(Page::SetLifecycleEventsEnabled { enabled: true })
            .map_err(|e| EngineError::page(format!("{:#}", e)))?;

        let listener = tab
            .add_event_listener(Arc::new(move |event: &Event| {
                if let Event::PageLifecycleEvent(lifecycle) = event {
                    if lifecycle.params.frame_id == main_frame {
                        let _ = sender.send(lifecycle.params.name.clone());
                    }
                }
            }))
            .map_err(|e| EngineError::page(format!("{:#}", e)))?;

        let outcome = (|| {
            tab.set_default_timeout(timeout);
            tab.navigate_to(url)
                .map_err(|e| EngineError::navigation(url, format!("{:#}", e)))?;

            // The navigation wait gets only what is left of the load budget
            tab.set_default_timeout(remaining_budget(deadline, Instant::now(), url, timeout)?);
            tab.wait_until_navigated()
                .map_err(|e| EngineError::navigation(url, format!("{:#}", e)))?;

            let mut watch = LifecycleWatch::new(idle);
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match receiver.recv_timeout(remaining) {
                    Ok(name) if watch.observe(&name) => return Ok(()),
                    Ok(_) => continue,
                    Err(RecvTimeoutError::Timeout) => return Err(EngineError::timeout(url, timeout)),
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(EngineError::navigation(
                            url,
                            "lifecycle listener detached before the network became idle",
                        ))
                    }
                }
            }
        })();

        let _ = tab.remove_event_listener(&listener);
        outcome
    }
}

#[async_trait]
impl BrowserPage for HeadlessChromePage {
    async fn navigate(
        &mut self,
        url: &str,
        idle: NetworkIdle,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        let tab = Arc::clone(&self.tab);
        let url = url.to_string();
        let navigation = {
            let url = url.clone();
            blocking(move || Self::navigate_blocking(&tab, &url, idle, timeout))
        };

        // Hard bound on the whole blocking navigation
        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| EngineError::timeout(&url, timeout))?
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>, EngineError> {
        let tab = Arc::clone(&self.tab);
        let script = text_content_script(selector);

        let raw = blocking(move || {
            let object = tab
                .evaluate(&script, false)
                .map_err(|e| EngineError::page(format!("{:#}", e)))?;
            match object.value {
                Some(serde_json::Value::String(raw)) => Ok(raw),
                other => Err(EngineError::page(format!(
                    "unexpected text content result: {:?}",
                    other
                ))),
            }
        })
        .await?;

        parse_text_content(&raw)
    }

    async fn content(&self) -> Result<String, EngineError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || {
            tab.get_content()
                .map_err(|e| EngineError::page(format!("{:#}", e)))
        })
        .await
    }

    async fn url(&self) -> Result<String, EngineError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || Ok(tab.get_url())).await
    }

    async fn title(&self) -> Result<String, EngineError> {
        let tab = Arc::clone(&self.tab);
        blocking(move || {
            tab.get_title()
                .map_err(|e| EngineError::page(format!("{:#}", e)))
        })
        .await
    }

    async fn close(self: Box<Self>) -> Result<(), EngineError> {
        let tab = self.tab;
        blocking(move || {
            tab.close(true)
                .map(|_| ())
                .map_err(|e| EngineError::page(format!("{:#}", e)))
        })
        .await
    }
}
