// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供领域层接口的具体实现。目前只有把RSS写入本地文件的存储实现。
pub mod storage;
