// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{
    create_test_app, create_test_app_with, insert_get_case, insert_suite,
};
use apitestrs::application::dto::job_response::JobResponseDto;
use apitestrs::application::dto::run_suite_response::RunSuiteResponseDto;
use apitestrs::application::dto::suite_response::{BindingResponseDto, SuiteStateResponseDto};
use apitestrs::domain::models::job::JobStatus;
use apitestrs::domain::models::suite::ExecutionState;
use apitestrs::domain::repositories::suite_repository::SuiteRepository;
use apitestrs::queue::handoff::HandoffStore;
use axum::http::StatusCode;
use serde_json::Value;
use uuid::Uuid;

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app().await;

    let health = app.server.get("/health").await;
    health.assert_status(StatusCode::OK);
    assert_eq!(health.text(), "OK");

    let version = app.server.get("/v1/version").await;
    version.assert_status(StatusCode::OK);
    assert_eq!(version.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_run_suite_enqueues_job_and_binds_it() {
    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_get_case(&db, 1, "/a", 200).await;
    insert_get_case(&db, 2, "/b", 404).await;
    insert_suite(&db, 10, &[2, 1]).await;

    let response = app.server.post("/v1/suites/10/run").await;
    response.assert_status(StatusCode::CREATED);
    let body: RunSuiteResponseDto = response.json();
    assert!(body.success);
    assert_eq!(body.suite_id, 10);
    assert_eq!(body.case_count, 2);

    // the snapshot is handed off in suite order before the job is visible
    let snapshot = app
        .components
        .handoff
        .fetch(body.job_id)
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<i64> = snapshot.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 1]);

    let job: JobResponseDto = app
        .server
        .get(&format!("/v1/jobs/{}", body.job_id))
        .await
        .json();
    assert_eq!(job.id, body.job_id);
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.case_count, 2);
    assert_eq!(job.exit_code, None);

    let binding: BindingResponseDto = app.server.get("/v1/suites/10/binding").await.json();
    assert_eq!(binding.job_id, body.job_id);
}

#[tokio::test]
async fn test_resubmitting_rebinds_to_the_newest_job() {
    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_get_case(&db, 1, "/a", 200).await;
    insert_suite(&db, 10, &[1]).await;

    let first: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();
    let second: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();
    assert_ne!(first.job_id, second.job_id);

    // both jobs exist, the binding follows the latest submission
    for job_id in [first.job_id, second.job_id] {
        app.server
            .get(&format!("/v1/jobs/{}", job_id))
            .await
            .assert_status(StatusCode::OK);
    }
    let binding: BindingResponseDto = app.server.get("/v1/suites/10/binding").await.json();
    assert_eq!(binding.job_id, second.job_id);
}

#[tokio::test]
async fn test_single_flight_rejects_overlapping_run() {
    let app = create_test_app_with(|settings| {
        settings.execution.single_flight_per_suite = true;
    })
    .await;
    let db = app.components.db.clone();
    insert_get_case(&db, 1, "/a", 200).await;
    insert_suite(&db, 10, &[1]).await;

    let first: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();

    let rejected = app.server.post("/v1/suites/10/run").await;
    rejected.assert_status(StatusCode::CONFLICT);
    let body: Value = rejected.json();
    assert_eq!(body["success"], false);

    let binding: BindingResponseDto = app.server.get("/v1/suites/10/binding").await.json();
    assert_eq!(binding.job_id, first.job_id);
}

#[tokio::test]
async fn test_run_unknown_or_empty_suite() {
    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_suite(&db, 11, &[404]).await;

    let missing = app.server.post("/v1/suites/999/run").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let body: Value = missing.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("999"));

    // no case of suite 11 exists, so nothing is enqueued or bound
    let empty = app.server.post("/v1/suites/11/run").await;
    empty.assert_status(StatusCode::BAD_REQUEST);
    app.server
        .get("/v1/suites/11/binding")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suite_state_endpoint() {
    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_suite(&db, 12, &[]).await;

    let state: SuiteStateResponseDto = app.server.get("/v1/suites/12/state").await.json();
    assert_eq!(state.state, 0);
    assert_eq!(state.state_name, "NOT_EXECUTED");

    app.components
        .catalog
        .update_execution_state(12, ExecutionState::Succeeded)
        .await
        .unwrap();
    let state: SuiteStateResponseDto = app.server.get("/v1/suites/12/state").await.json();
    assert_eq!(state.state, 1);
    assert_eq!(state.state_name, "SUCCEEDED");

    app.server
        .get("/v1/suites/13/state")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let app = create_test_app().await;
    let path = format!("/v1/jobs/{}", Uuid::new_v4());
    app.server
        .get(&path)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get(&format!("{}/events", path))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
