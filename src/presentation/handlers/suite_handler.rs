// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::run_suite_response::RunSuiteResponseDto;
use crate::application::dto::suite_response::{BindingResponseDto, SuiteStateResponseDto};
use crate::application::use_cases::submit_suite::SubmitSuiteUseCase;
use crate::domain::repositories::binding_repository::BindingRepository;
use crate::domain::repositories::suite_repository::SuiteRepository;
use crate::presentation::errors::{AppError, NotFound};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// 提交套件运行
///
/// 立即返回作业ID，调用方随后可订阅 `/v1/jobs/{job_id}/events`
pub async fn run_suite(
    Path(suite_id): Path<i64>,
    Extension(use_case): Extension<Arc<SubmitSuiteUseCase>>,
) -> Result<(StatusCode, Json<RunSuiteResponseDto>), AppError> {
    let job = use_case.submit(suite_id).await?;
    Ok((StatusCode::CREATED, Json(job.into())))
}

/// 查询套件最近一次运行绑定的作业
pub async fn get_binding(
    Path(suite_id): Path<i64>,
    Extension(bindings): Extension<Arc<dyn BindingRepository>>,
) -> Result<Json<BindingResponseDto>, AppError> {
    let binding = bindings
        .find_by_suite(suite_id)
        .await?
        .ok_or_else(|| NotFound(format!("Binding for suite {}", suite_id)))?;
    Ok(Json(binding.into()))
}

/// 查询套件执行状态
pub async fn get_state(
    Path(suite_id): Path<i64>,
    Extension(suites): Extension<Arc<dyn SuiteRepository>>,
) -> Result<Json<SuiteStateResponseDto>, AppError> {
    let suite = suites
        .find_by_id(suite_id)
        .await?
        .ok_or_else(|| NotFound(format!("Suite {}", suite_id)))?;
    Ok(Json(SuiteStateResponseDto::from(&suite)))
}
