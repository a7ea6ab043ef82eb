// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::StreamSettings;
use crate::domain::models::event::ProgressEvent;
use crate::domain::repositories::job_repository::JobRepository;
use crate::presentation::errors::{AppError, JobFinished, NotFound};
use crate::streaming::gateway::StreamGateway;
use axum::{
    extract::{Extension, Path},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

/// 订阅作业的实时进度
///
/// 响应头发出前订阅已经生效。流在转发 `SESSION_END` 后结束，
/// 调用方断开时转发任务随之停止。
pub async fn stream_job_events(
    Path(job_id): Path<Uuid>,
    Extension(jobs): Extension<Arc<dyn JobRepository>>,
    Extension(gateway): Extension<Arc<StreamGateway>>,
    Extension(settings): Extension<StreamSettings>,
    Extension(shutdown): Extension<watch::Receiver<bool>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let job = jobs
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| NotFound(format!("Job {}", job_id)))?;
    if !job.is_in_flight() {
        return Err(JobFinished(job_id).into());
    }

    let events = gateway.open(job_id, shutdown).await?;
    info!(job_id = %job_id, "Caller subscribed to job events");

    let retry = Duration::from_millis(settings.retry_ms);
    let stream = events.map(move |event| Ok(to_sse_event(&event, retry)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// 把进度事件转换为 SSE 帧
///
/// `id` 为事件序号，事件名固定为 `message`，
/// `data` 为 `{status, message}`，带通过标记时附加 `passed`
pub fn to_sse_event(event: &ProgressEvent, retry: Duration) -> Event {
    let mut data = json!({
        "status": event.status,
        "message": event.message,
    });
    if let Some(passed) = event.passed {
        data["passed"] = json!(passed);
    }

    Event::default()
        .id(event.sequence.to_string())
        .event("message")
        .retry(retry)
        .data(data.to_string())
}
