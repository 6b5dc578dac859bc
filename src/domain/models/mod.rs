// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了一次抓取过程中流转的值类型：
/// - 渲染结果（RenderedCandidate）：单次导航读到的两份候选内容
/// - 提取结果（ExtractedFeed）：规范化后的RSS及其来源策略
/// - 诊断快照（DiagnosticSnapshot）：失败时记录的页面状态
pub mod rendered_page;
