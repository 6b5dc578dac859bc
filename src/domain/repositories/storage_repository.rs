// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 订阅源存储特质
///
/// 定义RSS输出的持久化接口。每次保存整体覆盖上一次的结果。
#[async_trait]
pub trait FeedStorage: Send + Sync {
    /// 保存XML内容，返回写入位置
    async fn save(&self, xml: &str) -> Result<PathBuf, StorageError>;
}
