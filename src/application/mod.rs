// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 把引擎路由与存储组合成完整的抓取流程
pub mod use_cases;
