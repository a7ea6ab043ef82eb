// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event::{EventKind, ProgressEvent};
use crate::streaming::channel::EventChannel;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// 单个作业的事件发布器
///
/// 负责分配从 1 开始的连续序号。发布失败只记录日志，不中断执行。
pub struct EventEmitter {
    channel: Arc<dyn EventChannel>,
    job_id: Uuid,
    sequence: AtomicU64,
}

impl EventEmitter {
    pub fn new(channel: Arc<dyn EventChannel>, job_id: Uuid) -> Self {
        Self {
            channel,
            job_id,
            sequence: AtomicU64::new(0),
        }
    }

    /// 发布一条事件并返回它
    ///
    /// # 参数
    ///
    /// * `kind` - 事件类型
    /// * `message` - 事件描述
    /// * `passed` - 通过标记
    pub async fn emit(
        &self,
        kind: EventKind,
        message: impl Into<String>,
        passed: Option<bool>,
    ) -> ProgressEvent {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let event = ProgressEvent::new(sequence, kind, message, passed);

        debug!(job_id = %self.job_id, sequence, kind = %kind, "{}", event.message);
        if let Err(e) = self.channel.publish(self.job_id, &event).await {
            warn!(job_id = %self.job_id, sequence, "Failed to publish progress event: {}", e);
        }
        event
    }

    /// 已发布的事件数量
    pub fn emitted(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}
