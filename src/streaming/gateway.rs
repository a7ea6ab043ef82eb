// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event::ProgressEvent;
use crate::streaming::channel::{ChannelError, EventChannel, EventSubscription};
use futures::stream::{self, BoxStream, StreamExt};
use metrics::gauge;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::debug;
use uuid::Uuid;

/// 转发结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// 已转发终止事件
    SessionEnded,
    /// 调用方断开
    CallerDisconnected,
    /// 服务端关闭
    ServerShutdown,
    /// 事件通道关闭
    ChannelClosed,
}

/// 面向单个调用方的事件流
pub type GatewayStream = BoxStream<'static, ProgressEvent>;

/// 实时事件网关
///
/// 每个 HTTP 调用方对应一个转发任务，把作业通道中的事件
/// 推给调用方，直到终止事件或调用方断开。
pub struct StreamGateway {
    channel: Arc<dyn EventChannel>,
    buffer: usize,
}

impl StreamGateway {
    /// 创建新的事件网关
    ///
    /// # 参数
    ///
    /// * `channel` - 事件通道
    /// * `buffer` - 每个调用方的转发缓冲大小
    pub fn new(channel: Arc<dyn EventChannel>, buffer: usize) -> Self {
        Self {
            channel,
            buffer: buffer.max(1),
        }
    }

    /// 为调用方打开作业事件流
    ///
    /// 返回前订阅已经生效，之后发布的事件都会被转发。
    /// 返回的流被丢弃即视为调用方断开。
    ///
    /// # 参数
    ///
    /// * `job_id` - 作业ID
    /// * `shutdown` - 服务端关闭信号
    pub async fn open(
        &self,
        job_id: Uuid,
        shutdown: watch::Receiver<bool>,
    ) -> Result<GatewayStream, ChannelError> {
        let subscription = self.channel.subscribe(job_id).await?;
        let (tx, rx) = mpsc::channel(self.buffer);

        gauge!("stream_subscribers_active").increment(1.0);
        tokio::spawn(async move {
            let end = forward(subscription, tx, shutdown).await;
            gauge!("stream_subscribers_active").decrement(1.0);
            debug!(job_id = %job_id, ?end, "Event stream closed");
        });

        let events = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        Ok(events.boxed())
    }
}

/// 把订阅中的事件转发给调用方
///
/// 每一轮在“调用方断开”“服务端关闭”“下一条事件”之间选择，
/// 断开优先判断，断开后不再读取通道。
pub async fn forward(
    mut events: EventSubscription,
    tx: mpsc::Sender<ProgressEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> StreamEnd {
    if *shutdown.borrow() {
        return StreamEnd::ServerShutdown;
    }
    // a dropped shutdown sender means no shutdown will ever be signalled
    let mut shutdown_live = true;

    loop {
        tokio::select! {
            biased;

            _ = tx.closed() => return StreamEnd::CallerDisconnected,

            changed = shutdown.changed(), if shutdown_live => {
                match changed {
                    Ok(()) if *shutdown.borrow() => return StreamEnd::ServerShutdown,
                    Ok(()) => {}
                    Err(_) => shutdown_live = false,
                }
            }

            next = events.next() => {
                let Some(event) = next else {
                    return StreamEnd::ChannelClosed;
                };
                let terminal = event.is_terminal();
                if tx.send(event).await.is_err() {
                    return StreamEnd::CallerDisconnected;
                }
                if terminal {
                    return StreamEnd::SessionEnded;
                }
            }
        }
    }
}
