// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event::ProgressEvent;
use crate::streaming::channel::{ChannelError, EventChannel, EventSubscription};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;
use uuid::Uuid;

/// 进程内事件通道
///
/// 每个作业一个广播发送端；终止事件发布后移除发送端，
/// 已有订阅者读完缓冲后流自然结束。最后一个订阅者断开时同样移除。
pub struct InMemoryEventChannel {
    topics: Arc<DashMap<Uuid, Topic>>,
    capacity: usize,
}

struct Topic {
    id: Uuid,
    sender: broadcast::Sender<ProgressEvent>,
}

/// 订阅端的接收器，释放时回收无人订阅的主题
struct TopicReceiver {
    receiver: broadcast::Receiver<ProgressEvent>,
    topics: Arc<DashMap<Uuid, Topic>>,
    job_id: Uuid,
    topic_id: Uuid,
}

impl Drop for TopicReceiver {
    fn drop(&mut self) {
        // our receiver is still alive here
        self.topics.remove_if(&self.job_id, |_, topic| {
            topic.id == self.topic_id && topic.sender.receiver_count() <= 1
        });
    }
}

impl InMemoryEventChannel {
    /// 创建新的进程内事件通道
    ///
    /// # 参数
    ///
    /// * `capacity` - 每个作业的广播缓冲容量
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// 当前仍有发送端的作业数量
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

#[async_trait]
impl EventChannel for InMemoryEventChannel {
    async fn publish(&self, job_id: Uuid, event: &ProgressEvent) -> Result<(), ChannelError> {
        if let Some(topic) = self.topics.get(&job_id) {
            // no receivers is not an error
            let _ = topic.sender.send(event.clone());
        }
        if event.is_terminal() {
            self.topics.remove(&job_id);
        }
        Ok(())
    }

    async fn subscribe(&self, job_id: Uuid) -> Result<EventSubscription, ChannelError> {
        let (receiver, topic_id) = {
            let topic = self.topics.entry(job_id).or_insert_with(|| Topic {
                id: Uuid::new_v4(),
                sender: broadcast::channel(self.capacity).0,
            });
            (topic.sender.subscribe(), topic.id)
        };

        let state = TopicReceiver {
            receiver,
            topics: self.topics.clone(),
            job_id,
            topic_id,
        };

        let events = stream::unfold(state, move |mut state| async move {
            loop {
                match state.receiver.recv().await {
                    Ok(event) => return Some((event, state)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(job_id = %job_id, "Subscriber lagged, {} events skipped", skipped);
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(events.boxed())
    }
}
