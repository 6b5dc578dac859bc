// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 网络空闲判定
//!
//! Chrome 通过 `Page.lifecycleEvent` 报告两种空闲状态：
//! - `networkAlmostIdle`：500ms 内不超过 2 个活动连接
//! - `networkIdle`：500ms 内没有活动连接
//!
//! 两个引擎分别使用其中一种作为导航完成条件。

use std::time::Duration;

/// 新文档开始加载时的生命周期事件
pub const LIFECYCLE_INIT: &str = "init";

/// 网络空闲条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkIdle {
    /// 不超过2个活动连接持续500ms
    AlmostIdle,
    /// 没有活动连接持续500ms
    Idle,
}

impl NetworkIdle {
    /// 对应的生命周期事件名
    pub fn lifecycle_event(&self) -> &'static str {
        match self {
            NetworkIdle::AlmostIdle => "networkAlmostIdle",
            NetworkIdle::Idle => "networkIdle",
        }
    }

    /// 允许的最大活动连接数
    pub fn max_inflight(&self) -> usize {
        match self {
            NetworkIdle::AlmostIdle => 2,
            NetworkIdle::Idle => 0,
        }
    }

    /// 需要保持安静的时长
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(500)
    }
}

/// 生命周期事件观察器
///
/// 只有在主框架出现新文档的 `init` 事件之后，空闲事件才被接受，
/// 避免把导航前 `about:blank` 的空闲事件误当作目标页面加载完成。
#[derive(Debug)]
pub struct LifecycleWatch {
    idle: NetworkIdle,
    document_started: bool,
}

impl LifecycleWatch {
    pub fn new(idle: NetworkIdle) -> Self {
        Self {
            idle,
            document_started: false,
        }
    }

    /// 处理一个主框架生命周期事件，返回是否已满足空闲条件
    pub fn observe(&mut self, event_name: &str) -> bool {
        if event_name == LIFECYCLE_INIT {
            self.document_started = true;
            return false;
        }
        self.document_started && event_name == self.idle.lifecycle_event()
    }
}
