// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::application::use_cases::submit_suite::SubmitError;
use crate::domain::models::error::DomainError;
use crate::domain::repositories::RepositoryError;
use crate::queue::handoff::HandoffError;
use crate::queue::job_queue::QueueError;
use crate::streaming::channel::ChannelError;

/// 请求的资源不存在
#[derive(Error, Debug)]
#[error("{0} not found")]
pub struct NotFound(pub String);

/// 作业已结束，不会再产生事件
#[derive(Error, Debug)]
#[error("Job {0} has already finished")]
pub struct JobFinished(pub Uuid);

/// 应用错误类型
///
/// 封装所有可能的应用层错误，按错误类型选择状态码
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.is::<NotFound>() {
            return StatusCode::NOT_FOUND;
        }
        if self.0.is::<JobFinished>() {
            return StatusCode::CONFLICT;
        }
        if self.0.is::<DomainError>() {
            return StatusCode::BAD_REQUEST;
        }
        if let Some(err) = self.0.downcast_ref::<SubmitError>() {
            return match err {
                SubmitError::SuiteNotFound(_) => StatusCode::NOT_FOUND,
                SubmitError::EmptySuite(_) | SubmitError::TooManyCases { .. } => {
                    StatusCode::BAD_REQUEST
                }
                SubmitError::AlreadyRunning { .. } => StatusCode::CONFLICT,
                SubmitError::Handoff(_) | SubmitError::Queue(_) => StatusCode::SERVICE_UNAVAILABLE,
                SubmitError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
                SubmitError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            return match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if self.0.is::<ChannelError>() || self.0.is::<QueueError>() || self.0.is::<HandoffError>()
        {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "success": false, "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
