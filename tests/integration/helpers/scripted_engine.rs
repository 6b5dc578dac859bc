// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use rssgrab::config::settings::BrowserSettings;
use rssgrab::engines::idle::NetworkIdle;
use rssgrab::engines::traits::{BrowserEngine, BrowserPage, BrowserSession, EngineError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BLANK_DOCUMENT: &str = "<html><head></head><body></body></html>";

/// 单次导航的预设结果
#[derive(Debug, Clone)]
pub enum Step {
    /// 导航成功，页面包含给定内容
    Render {
        preformatted: Option<String>,
        document: String,
    },
    /// 导航失败
    NavigationFails,
    /// 导航超时
    TimesOut,
}

impl Step {
    pub fn pre(text: &str) -> Self {
        Step::Render {
            preformatted: Some(text.to_string()),
            document: format!("<html><body><pre>{}</pre></body></html>", text),
        }
    }

    pub fn document(markup: &str) -> Self {
        Step::Render {
            preformatted: None,
            document: markup.to_string(),
        }
    }
}

/// 引擎各生命周期操作的调用计数
#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub navigations: AtomicUsize,
    pub idle_conditions: Mutex<Vec<NetworkIdle>>,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// 按脚本返回结果的内存引擎
///
/// 脚本用完后每次导航都失败
pub struct ScriptedEngine {
    name: &'static str,
    idle: NetworkIdle,
    launch_fails: bool,
    script: Arc<Mutex<VecDeque<Step>>>,
    pub counters: Arc<Counters>,
}

impl ScriptedEngine {
    pub fn new(name: &'static str, idle: NetworkIdle, steps: Vec<Step>) -> Self {
        Self {
            name,
            idle,
            launch_fails: false,
            script: Arc::new(Mutex::new(steps.into())),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn failing(name: &'static str, idle: NetworkIdle) -> Self {
        Self::new(name, idle, vec![])
    }

    pub fn unlaunchable(name: &'static str, idle: NetworkIdle) -> Self {
        Self {
            launch_fails: true,
            ..Self::new(name, idle, vec![])
        }
    }

    pub fn session(&self) -> ScriptedSession {
        ScriptedSession {
            script: self.script.clone(),
            counters: self.counters.clone(),
        }
    }
}

#[async_trait]
impl BrowserEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn network_idle(&self) -> NetworkIdle {
        self.idle
    }

    async fn launch(
        &self,
        _settings: &BrowserSettings,
    ) -> Result<Box<dyn BrowserSession>, EngineError> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        if self.launch_fails {
            return Err(EngineError::Launch {
                engine: self.name,
                message: "Could not auto detect a chrome executable".to_string(),
            });
        }
        Ok(Box::new(self.session()))
    }
}

pub struct ScriptedSession {
    script: Arc<Mutex<VecDeque<Step>>>,
    counters: Arc<Counters>,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, EngineError> {
        self.counters.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedPage {
            script: self.script.clone(),
            counters: self.counters.clone(),
            url: "about:blank".to_string(),
            preformatted: None,
            document: BLANK_DOCUMENT.to_string(),
        }))
    }

    async fn shutdown(self: Box<Self>) -> Result<(), EngineError> {
        self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct ScriptedPage {
    script: Arc<Mutex<VecDeque<Step>>>,
    counters: Arc<Counters>,
    url: String,
    preformatted: Option<String>,
    document: String,
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn navigate(
        &mut self,
        url: &str,
        idle: NetworkIdle,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        self.counters.idle_conditions.lock().unwrap().push(idle);

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Step::NavigationFails);

        match step {
            Step::Render {
                preformatted,
                document,
            } => {
                self.url = url.to_string();
                self.preformatted = preformatted;
                self.document = document;
                Ok(())
            }
            Step::NavigationFails => Err(EngineError::navigation(url, "net::ERR_CONNECTION_RESET")),
            Step::TimesOut => Err(EngineError::timeout(url, timeout)),
        }
    }

    async fn text_content(&self, _selector: &str) -> Result<Option<String>, EngineError> {
        Ok(self.preformatted.clone())
    }

    async fn content(&self) -> Result<String, EngineError> {
        Ok(self.document.clone())
    }

    async fn url(&self) -> Result<String, EngineError> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> Result<String, EngineError> {
        Ok(String::new())
    }

    async fn close(self: Box<Self>) -> Result<(), EngineError> {
        self.counters.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
