// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::PageSettings;
use crate::domain::models::rendered_page::{DiagnosticSnapshot, RenderedCandidate};
use crate::domain::services::extraction_service::ExtractionService;
use crate::engines::idle::NetworkIdle;
use crate::engines::traits::{BrowserPage, BrowserSession, EngineError};
use std::time::Duration;
use tracing::{debug, error, warn};

/// 承载原始RSS文本的元素
pub const PREFORMATTED_SELECTOR: &str = "pre";

/// 渲染驱动
///
/// 每次尝试打开一个新标签页，导航、等待、读取候选内容，结束时总是关闭标签页。
pub struct RenderingDriver {
    target_url: String,
    idle: NetworkIdle,
    load_timeout: Duration,
    post_load_wait: Duration,
}

impl RenderingDriver {
    pub fn new(target_url: impl Into<String>, page: &PageSettings, idle: NetworkIdle) -> Self {
        Self {
            target_url: target_url.into(),
            idle,
            load_timeout: page.load_timeout(),
            post_load_wait: page.post_load_wait(),
        }
    }

    /// 执行一次导航并读取两份候选内容
    ///
    /// 失败时记录诊断快照后返回错误
    pub async fn fetch_once(
        &self,
        session: &dyn BrowserSession,
    ) -> Result<RenderedCandidate, EngineError> {
        let mut page = session.new_page().await?;
        let outcome = self.render_or_diagnose(page.as_mut()).await;
        self.release(page).await;
        outcome
    }

    /// 执行一次导航并提取RSS内容
    ///
    /// 页面中找不到RSS时同样视为一次失败的尝试
    pub async fn fetch_feed(&self, session: &dyn BrowserSession) -> Result<String, EngineError> {
        let mut page = session.new_page().await?;
        let outcome = self.extract_or_diagnose(page.as_mut()).await;
        self.release(page).await;
        outcome
    }

    async fn extract_or_diagnose(&self, page: &mut dyn BrowserPage) -> Result<String, EngineError> {
        let candidate = self.render_or_diagnose(page).await?;

        match ExtractionService::extract(&candidate) {
            Some(feed) => {
                debug!(
                    "Extracted {} bytes of RSS via {:?}",
                    feed.xml.len(),
                    feed.strategy
                );
                Ok(feed.xml)
            }
            None => {
                let url = capture_diagnostics(page)
                    .await
                    .map(|snapshot| snapshot.final_url)
                    .filter(|url| !url.is_empty())
                    .unwrap_or_else(|| self.target_url.clone());
                Err(EngineError::NoFeedContent { url })
            }
        }
    }

    async fn render_or_diagnose(
        &self,
        page: &mut dyn BrowserPage,
    ) -> Result<RenderedCandidate, EngineError> {
        let outcome = self.render(page).await;
        if outcome.is_err() {
            capture_diagnostics(page).await;
        }
        outcome
    }

    async fn render(&self, page: &mut dyn BrowserPage) -> Result<RenderedCandidate, EngineError> {
        page.navigate(&self.target_url, self.idle, self.load_timeout)
            .await?;
        tokio::time::sleep(self.post_load_wait).await;

        // A missing <pre> element is not an error, but a failed read is
        let preformatted = page
            .text_content(PREFORMATTED_SELECTOR)
            .await
            .map_err(|e| EngineError::read(&self.target_url, e))?;
        let full_document = page
            .content()
            .await
            .map_err(|e| EngineError::read(&self.target_url, e))?;

        Ok(RenderedCandidate {
            preformatted,
            full_document,
        })
    }

    async fn release(&self, page: Box<dyn BrowserPage>) {
        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", self.target_url, e);
        }
    }
}

/// 采集并记录诊断快照
///
/// 页面本身已损坏时采集也可能失败，此时只记录警告
pub async fn capture_diagnostics(page: &dyn BrowserPage) -> Option<DiagnosticSnapshot> {
    let snapshot = async {
        let final_url = page.url().await?;
        let title = page.title().await?;
        let content = page.content().await?;
        Ok::<_, EngineError>(DiagnosticSnapshot::new(final_url, title, &content))
    }
    .await;

    match snapshot {
        Ok(snapshot) => {
            error!("Debug info:");
            error!("  Final URL: {}", snapshot.final_url);
            error!("  Page title: {}", snapshot.title);
            error!("  Content length: {}", snapshot.content_length);
            error!("  Content preview: {}", snapshot.content_preview);
            Some(snapshot)
        }
        Err(e) => {
            warn!("Failed to capture diagnostic snapshot: {}", e);
            None
        }
    }
}
