// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
/// 包括重试执行、退避策略、文本修复、遥测初始化等功能
pub mod retry;
pub mod retry_policy;
pub mod telemetry;
pub mod text_processing;
