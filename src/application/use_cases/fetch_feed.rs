// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    domain::repositories::storage_repository::{FeedStorage, StorageError},
    engines::{router::EngineRouter, traits::EngineError},
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FetchFeedError {
    #[error("Failed to acquire feed")]
    Acquire(#[source] EngineError),
    #[error("Failed to save feed")]
    Storage(#[from] StorageError),
}

impl From<EngineError> for FetchFeedError {
    fn from(error: EngineError) -> Self {
        FetchFeedError::Acquire(error)
    }
}

/// 抓取RSS并保存的用例
pub struct FetchFeedUseCase<S: ?Sized> {
    router: Arc<EngineRouter>,
    storage: Arc<S>,
}

impl<S> FetchFeedUseCase<S>
where
    S: FeedStorage + ?Sized,
{
    pub fn new(router: Arc<EngineRouter>, storage: Arc<S>) -> Self {
        Self { router, storage }
    }

    /// 获取RSS内容，成功后整体写入存储
    ///
    /// 获取失败时不会触碰存储，上一次的输出保持原样
    pub async fn execute(&self) -> Result<PathBuf, FetchFeedError> {
        let xml = self.router.acquire().await?;
        let path = self.storage.save(&xml).await?;
        info!("Saved {} bytes to {}", xml.len(), path.display());
        Ok(path)
    }
}
