// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rendered_page::{ExtractedFeed, ExtractionStrategy, RenderedCandidate};
use crate::utils::text_processing::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

/// RSS根元素标记
pub const FEED_ROOT_MARKER: &str = "<rss";

/// 页面标记回退路径补上的XML声明
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

// Greedy on purpose: first `<rss` through the last `</rss>` in the document.
static FEED_ROOT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<rss.*</rss>").expect("feed root pattern is valid"));

/// 提取服务
///
/// 负责从渲染结果中定位并规范化RSS内容
pub struct ExtractionService;

impl ExtractionService {
    /// 从渲染结果中提取RSS
    pub fn extract(candidate: &RenderedCandidate) -> Option<ExtractedFeed> {
        extract_feed(candidate.preformatted.as_deref(), &candidate.full_document)
    }
}

/// 按顺序尝试三种策略，返回第一个成功的结果
///
/// 1. `<pre>` 文本包含 `<rss`：去除首尾空白后原样返回
/// 2. 页面标记中匹配到 `<rss ... </rss>`：补上XML声明后返回
/// 3. `<pre>` 文本解码一次实体后包含 `<rss`：去除首尾空白后返回
pub fn extract_feed(preformatted: Option<&str>, full_document: &str) -> Option<ExtractedFeed> {
    if let Some(text) = preformatted.filter(|t| t.contains(FEED_ROOT_MARKER)) {
        return Some(ExtractedFeed {
            xml: text.trim().to_string(),
            strategy: ExtractionStrategy::Preformatted,
        });
    }

    if let Some(found) = FEED_ROOT_PATTERN.find(full_document) {
        return Some(ExtractedFeed {
            xml: format!("{}{}", XML_DECLARATION, found.as_str()),
            strategy: ExtractionStrategy::DocumentMarkup,
        });
    }

    let decoded = decode_html_entities(preformatted?);
    if decoded.contains(FEED_ROOT_MARKER) {
        return Some(ExtractedFeed {
            xml: decoded.trim().to_string(),
            strategy: ExtractionStrategy::DecodedPreformatted,
        });
    }

    None
}
