// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 端到端测试模块
///
/// 从引擎回退到文件落盘的完整流程
pub mod fetch_feed_test;
