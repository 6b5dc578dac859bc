// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 诊断预览的最大字符数
pub const PREVIEW_CHARS: usize = 500;

/// 单次导航的渲染结果
///
/// 浏览器有时把原始RSS作为 `<pre>` 元素中的文本展示，有时直接把RSS根元素
/// 放进页面标记中，因此同时保留两份候选内容。每次导航重新生成，不跨尝试保留。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCandidate {
    /// 第一个 `<pre>` 元素的文本内容，不存在时为 `None`
    pub preformatted: Option<String>,
    /// 渲染后的完整页面标记
    pub full_document: String,
}

impl RenderedCandidate {
    pub fn new(preformatted: Option<String>, full_document: impl Into<String>) -> Self {
        Self {
            preformatted,
            full_document: full_document.into(),
        }
    }
}

/// 提取所使用的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// `<pre>` 文本中直接包含RSS根元素
    Preformatted,
    /// 在完整页面标记中匹配到RSS根元素
    DocumentMarkup,
    /// `<pre>` 文本经过一次实体解码后包含RSS根元素
    DecodedPreformatted,
}

/// 提取成功的RSS内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFeed {
    /// 规范化后的XML文本（尚未清理控制字符）
    pub xml: String,
    /// 产生该结果的策略
    pub strategy: ExtractionStrategy,
}

/// 失败时采集的页面诊断快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticSnapshot {
    /// 页面最终URL
    pub final_url: String,
    /// 页面标题
    pub title: String,
    /// 页面内容长度（字符数）
    pub content_length: usize,
    /// 页面内容预览
    pub content_preview: String,
}

impl DiagnosticSnapshot {
    pub fn new(final_url: String, title: String, content: &str) -> Self {
        Self {
            final_url,
            title,
            content_length: content.chars().count(),
            content_preview: content.chars().take(PREVIEW_CHARS).collect(),
        }
    }
}
