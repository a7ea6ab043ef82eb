// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::submit_suite::SubmitSuiteUseCase;
use crate::config::settings::StreamSettings;
use crate::domain::repositories::binding_repository::BindingRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::suite_repository::SuiteRepository;
use crate::presentation::handlers::{events_handler, job_handler, suite_handler};
use crate::streaming::gateway::StreamGateway;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

/// 路由依赖
pub struct ApiState {
    pub submit: Arc<SubmitSuiteUseCase>,
    pub jobs: Arc<dyn JobRepository>,
    pub suites: Arc<dyn SuiteRepository>,
    pub bindings: Arc<dyn BindingRepository>,
    pub gateway: Arc<StreamGateway>,
    pub stream: StreamSettings,
    /// 服务端关闭信号，用于结束进行中的事件流
    pub shutdown: watch::Receiver<bool>,
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回未注入依赖的路由
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/v1/suites/{suite_id}/run", post(suite_handler::run_suite))
        .route(
            "/v1/suites/{suite_id}/binding",
            get(suite_handler::get_binding),
        )
        .route("/v1/suites/{suite_id}/state", get(suite_handler::get_state))
        .route("/v1/jobs/{job_id}", get(job_handler::get_job))
        .route(
            "/v1/jobs/{job_id}/events",
            get(events_handler::stream_job_events),
        )
}

/// 创建注入依赖后的完整应用
pub fn app(state: ApiState) -> Router {
    routes()
        .layer(Extension(state.submit))
        .layer(Extension(state.jobs))
        .layer(Extension(state.suites))
        .layer(Extension(state.bindings))
        .layer(Extension(state.gateway))
        .layer(Extension(state.stream))
        .layer(Extension(state.shutdown))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
