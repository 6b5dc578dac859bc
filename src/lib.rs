// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 组合引擎路由与存储，完成一次完整的抓取
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含渲染结果模型、RSS提取服务和存储接口
pub mod domain;

/// 引擎模块
///
/// 实现基于无头浏览器的渲染引擎及其回退路由
pub mod engines;

/// 基础设施模块
///
/// 提供本地文件存储
pub mod infrastructure;

/// 工具模块
///
/// 提供重试、文本处理和日志初始化等通用功能
pub mod utils;
