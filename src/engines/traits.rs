// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::BrowserSettings;
use crate::engines::idle::NetworkIdle;
use crate::utils::retry::RetryError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 浏览器无法启动或连接
    #[error("Failed to launch {engine}: {message}")]
    Launch {
        engine: &'static str,
        message: String,
    },
    /// 导航失败
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    /// 导航超时
    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
    /// 导航完成后读取页面内容失败
    #[error("Reading {url} failed: {message}")]
    Read { url: String, message: String },
    /// 页面操作失败
    #[error("Page operation failed: {0}")]
    Page(String),
    /// 页面中没有RSS内容
    #[error("No RSS content found at {url}")]
    NoFeedContent { url: String },
    /// 单个引擎的全部尝试均失败
    #[error("{engine} failed after {attempts} attempt(s)")]
    Exhausted {
        engine: String,
        attempts: u32,
        #[source]
        source: Box<EngineError>,
    },
    /// 没有可用引擎
    #[error("All engines failed")]
    AllEnginesFailed,
}

impl EngineError {
    pub fn page(error: impl std::fmt::Display) -> Self {
        EngineError::Page(error.to_string())
    }

    pub fn navigation(url: &str, error: impl std::fmt::Display) -> Self {
        EngineError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub fn read(url: &str, error: impl std::fmt::Display) -> Self {
        EngineError::Read {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub fn timeout(url: &str, timeout: Duration) -> Self {
        EngineError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// 判断错误是否应该触发切换到下一个引擎
    ///
    /// 启动失败和重试耗尽都表示该引擎路径已不可用
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self,
            EngineError::Launch { .. } | EngineError::Exhausted { .. }
        )
    }
}

impl From<RetryError<EngineError>> for EngineError {
    fn from(error: RetryError<EngineError>) -> Self {
        EngineError::Exhausted {
            engine: error.name,
            attempts: error.attempts,
            source: Box::new(error.source),
        }
    }
}

/// 浏览器引擎特质
///
/// 每种实现对应一个浏览器自动化库，各自给出网络空闲的判定方式
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// 引擎名称
    fn name(&self) -> &'static str;

    /// 导航完成的网络空闲条件
    fn network_idle(&self) -> NetworkIdle;

    /// 启动浏览器进程（或连接已有实例）
    async fn launch(&self, settings: &BrowserSettings)
        -> Result<Box<dyn BrowserSession>, EngineError>;
}

/// 已启动的浏览器实例
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// 打开新标签页
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, EngineError>;

    /// 关闭浏览器并释放进程
    async fn shutdown(self: Box<Self>) -> Result<(), EngineError>;
}

/// 单个标签页
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// 导航到指定URL，等待网络空闲，超时后返回 [`EngineError::Timeout`]
    async fn navigate(
        &mut self,
        url: &str,
        idle: NetworkIdle,
        timeout: Duration,
    ) -> Result<(), EngineError>;

    /// 第一个匹配选择器的元素的文本内容，不存在时返回 `None`
    async fn text_content(&self, selector: &str) -> Result<Option<String>, EngineError>;

    /// 完整页面标记
    async fn content(&self) -> Result<String, EngineError>;

    /// 当前URL
    async fn url(&self) -> Result<String, EngineError>;

    /// 页面标题
    async fn title(&self) -> Result<String, EngineError>;

    /// 关闭标签页
    async fn close(self: Box<Self>) -> Result<(), EngineError>;
}

/// 读取第一个匹配元素 `textContent` 的脚本
///
/// 结果经过 `JSON.stringify`，使"元素不存在"(`null`)与空字符串可以区分
pub fn text_content_script(selector: &str) -> String {
    let selector = serde_json::Value::String(selector.to_string());
    format!(
        "(() => {{ const el = document.querySelector({selector}); \
         return JSON.stringify(el ? el.textContent : null); }})()"
    )
}

/// 解析 [`text_content_script`] 的返回值
pub fn parse_text_content(raw: &str) -> Result<Option<String>, EngineError> {
    serde_json::from_str(raw).map_err(EngineError::page)
}
