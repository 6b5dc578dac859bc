// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：渲染结果、提取结果、诊断快照
/// - 仓库接口（repositories）：输出持久化抽象接口
/// - 服务（services）：RSS内容提取规则
///
/// 领域层不依赖浏览器或文件系统，可以脱离外部环境测试。
pub mod models;
pub mod repositories;
pub mod services;
