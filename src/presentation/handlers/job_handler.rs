// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::job_response::JobResponseDto;
use crate::domain::repositories::job_repository::JobRepository;
use crate::presentation::errors::{AppError, NotFound};
use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// 查询作业记录
pub async fn get_job(
    Path(job_id): Path<Uuid>,
    Extension(jobs): Extension<Arc<dyn JobRepository>>,
) -> Result<Json<JobResponseDto>, AppError> {
    let job = jobs
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| NotFound(format!("Job {}", job_id)))?;
    Ok(Json(job.into()))
}
