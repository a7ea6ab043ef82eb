// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::{
    create_test_app, insert_case, insert_environment, insert_get_case, insert_suite, TestApp,
};
use apitestrs::application::dto::job_response::JobResponseDto;
use apitestrs::application::dto::run_suite_response::RunSuiteResponseDto;
use apitestrs::application::dto::suite_response::SuiteStateResponseDto;
use apitestrs::domain::models::job::JobStatus;
use apitestrs::queue::handoff::HandoffStore;
use apitestrs::workers::manager::WorkerManager;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn start_workers(app: &TestApp) -> WorkerManager {
    let mut manager = app
        .components
        .worker_manager(app.shutdown_rx.clone())
        .unwrap();
    manager.start_workers(1);
    manager
}

/// 轮询直到作业离开排队与执行状态
async fn wait_until_finished(app: &TestApp, job_id: Uuid) -> JobResponseDto {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let job: JobResponseDto = app
                .server
                .get(&format!("/v1/jobs/{}", job_id))
                .await
                .json();
            if !matches!(job.status, JobStatus::Queued | JobStatus::Active) {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("job did not finish in time")
}

async fn shutdown(app: &TestApp, manager: WorkerManager) {
    app.shutdown_tx.send(true).unwrap();
    manager.join(Duration::from_secs(5)).await;
}

#[tokio::test]
async fn test_passing_suite_marks_succeeded_and_leaves_report() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "1"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&target)
        .await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({"name": "ada"})))
        .respond_with(ResponseTemplate::new(201))
        .mount(&target)
        .await;

    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_environment(&db, &target.uri(), json!({"x-api-key": "secret"})).await;
    insert_case(&db, 1, "GET", "/users", "params", json!({"page": 1}), 200).await;
    insert_case(&db, 2, "POST", "/users", "json", json!({"name": "ada"}), 201).await;
    insert_suite(&db, 10, &[1, 2]).await;
    let manager = start_workers(&app);

    let submitted: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();
    let job = wait_until_finished(&app, submitted.job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.exit_code, Some(0));
    assert_eq!(job.attempt_count, 1);

    let state: SuiteStateResponseDto = app.server.get("/v1/suites/10/state").await.json();
    assert_eq!(state.state_name, "SUCCEEDED");

    // per-case results and the report sit under the job's directory
    let job_dir = app.storage_dir.path().join(submitted.job_id.to_string());
    let first = std::fs::read_to_string(job_dir.join("raw/0000-case-1-result.json")).unwrap();
    let first: Value = serde_json::from_str(&first).unwrap();
    assert_eq!(first["passed"], true);
    assert_eq!(first["observed_status_code"], 200);
    assert!(job_dir.join("raw/0001-case-2-result.json").exists());
    let report = std::fs::read_to_string(job_dir.join("report/index.html")).unwrap();
    assert!(report.contains("2 results"));

    let snapshot = app.components.handoff.fetch(submitted.job_id).await.unwrap();
    assert!(snapshot.is_none());

    shutdown(&app, manager).await;
}

#[tokio::test]
async fn test_failed_assertion_marks_suite_failed() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&target)
        .await;

    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_environment(&db, &target.uri(), json!({})).await;
    insert_get_case(&db, 1, "/health", 200).await;
    insert_suite(&db, 10, &[1]).await;
    let manager = start_workers(&app);

    let submitted: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();
    let job = wait_until_finished(&app, submitted.job_id).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.exit_code, Some(1));

    let state: SuiteStateResponseDto = app.server.get("/v1/suites/10/state").await.json();
    assert_eq!(state.state_name, "FAILED");

    shutdown(&app, manager).await;
}

#[tokio::test]
async fn test_missing_environment_fails_job_without_touching_suite() {
    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_get_case(&db, 1, "/health", 200).await;
    insert_suite(&db, 10, &[1]).await;
    let manager = start_workers(&app);

    let submitted: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();
    let job = wait_until_finished(&app, submitted.job_id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.exit_code, Some(4));

    let state: SuiteStateResponseDto = app.server.get("/v1/suites/10/state").await.json();
    assert_eq!(state.state_name, "NOT_EXECUTED");

    // the snapshot stays until it expires
    let snapshot = app.components.handoff.fetch(submitted.job_id).await.unwrap();
    assert!(snapshot.is_some());

    shutdown(&app, manager).await;
}

#[tokio::test]
async fn test_workers_stop_on_shutdown_signal() {
    let app = create_test_app().await;
    let manager = start_workers(&app);
    assert_eq!(manager.worker_count(), 1);

    app.shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), manager.join(Duration::from_secs(1)))
        .await
        .expect("workers did not stop");
}
