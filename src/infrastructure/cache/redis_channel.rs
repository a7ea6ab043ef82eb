// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event::ProgressEvent;
use crate::infrastructure::cache::redis_client::RedisClient;
use crate::streaming::channel::{topic_for, ChannelError, EventChannel, EventSubscription};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::warn;
use uuid::Uuid;

/// 基于 Redis PUBLISH/SUBSCRIBE 的事件通道
///
/// API 进程与工作器进程之间唯一的实时链路，不保留历史消息
#[derive(Clone)]
pub struct RedisEventChannel {
    client: RedisClient,
    prefix: String,
}

impl RedisEventChannel {
    /// 创建新的 Redis 事件通道
    ///
    /// # 参数
    ///
    /// * `client` - Redis客户端
    /// * `prefix` - 主题前缀
    pub fn new(client: RedisClient, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl EventChannel for RedisEventChannel {
    async fn publish(&self, job_id: Uuid, event: &ProgressEvent) -> Result<(), ChannelError> {
        let payload = serde_json::to_string(event)?;
        self.client
            .publish(&topic_for(&self.prefix, job_id), &payload)
            .await
            .map_err(|e| ChannelError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn subscribe(&self, job_id: Uuid) -> Result<EventSubscription, ChannelError> {
        let pubsub = self
            .client
            .subscribe(&topic_for(&self.prefix, job_id))
            .await
            .map_err(|e| ChannelError::Unavailable(e.to_string()))?;

        let events = pubsub.into_on_message().filter_map(move |msg| async move {
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(job_id = %job_id, "Unreadable event payload: {}", e);
                    return None;
                }
            };
            match serde_json::from_str::<ProgressEvent>(&payload) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(job_id = %job_id, "Undecodable event payload: {}", e);
                    None
                }
            }
        });

        Ok(events.boxed())
    }
}
