// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event::ProgressEvent;
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use uuid::Uuid;

/// 事件通道错误类型
#[derive(Error, Debug)]
pub enum ChannelError {
    /// 消息代理不可用
    #[error("Event broker unavailable: {0}")]
    Unavailable(String),
    /// 事件序列化失败
    #[error("Event encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// 订阅得到的事件流
///
/// 只包含订阅建立之后发布的事件；丢弃即取消订阅
pub type EventSubscription = BoxStream<'static, ProgressEvent>;

/// 按作业划分主题的发布订阅通道
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// 发布事件，没有订阅者时事件直接丢弃
    async fn publish(&self, job_id: Uuid, event: &ProgressEvent) -> Result<(), ChannelError>;

    /// 订阅作业的事件，返回时订阅已经生效
    async fn subscribe(&self, job_id: Uuid) -> Result<EventSubscription, ChannelError>;
}

/// 作业事件主题名
pub fn topic_for(prefix: &str, job_id: Uuid) -> String {
    format!("{}:job:{}:events", prefix, job_id)
}
