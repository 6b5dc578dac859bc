// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::repositories::storage_repository::{FeedStorage, StorageError};

/// 本地文件系统存储实现
///
/// 先写入同目录下的临时文件再重命名，读者不会看到写了一半的文件
pub struct LocalFileStorage {
    path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> Result<PathBuf, StorageError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| {
                StorageError::Other(format!("Invalid output path: {}", self.path.display()))
            })?
            .to_string_lossy();
        Ok(self.path.with_file_name(format!(".{}.tmp", file_name)))
    }
}

#[async_trait]
impl FeedStorage for LocalFileStorage {
    async fn save(&self, xml: &str) -> Result<PathBuf, StorageError> {
        let temp_path = self.temp_path()?;

        // 确保目录存在
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(xml.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(e));
        }

        Ok(self.path.clone())
    }
}
