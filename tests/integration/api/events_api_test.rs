// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{
    create_test_app, insert_environment, insert_get_case, insert_suite, wait_for_subscriber,
};
use apitestrs::application::dto::run_suite_response::RunSuiteResponseDto;
use apitestrs::domain::models::job::ExitCode;
use apitestrs::queue::job_queue::JobQueue;
use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 解析 SSE 响应体，返回 `(id, data)` 列表
pub fn parse_frames(body: &str) -> Vec<(u64, Value)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut id = None;
            let mut data = None;
            for line in frame.lines() {
                if let Some(value) = line.strip_prefix("id: ") {
                    id = value.trim().parse().ok();
                } else if let Some(value) = line.strip_prefix("data: ") {
                    data = serde_json::from_str(value).ok();
                }
            }
            Some((id?, data?))
        })
        .collect()
}

#[tokio::test]
async fn test_finished_job_cannot_be_streamed() {
    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_get_case(&db, 1, "/a", 200).await;
    insert_suite(&db, 10, &[1]).await;

    let job: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();
    let worker = Uuid::new_v4();
    app.components.queue.dequeue(worker).await.unwrap().unwrap();
    app.components
        .queue
        .complete(job.job_id, worker, ExitCode::AllPassed)
        .await
        .unwrap();

    let response = app
        .server
        .get(&format!("/v1/jobs/{}/events", job.job_id))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_stream_carries_run_until_session_end() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&target)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&target)
        .await;

    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_environment(&db, &target.uri(), json!({})).await;
    insert_get_case(&db, 1, "/a", 200).await;
    insert_get_case(&db, 2, "/b", 200).await;
    insert_suite(&db, 10, &[1, 2]).await;

    let job: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();
    let service = app.components.execution_service().unwrap();

    let url = format!("/v1/jobs/{}/events", job.job_id);
    let request = async { app.server.get(&url).await };
    let run = async {
        wait_for_subscriber(&app.channel).await;
        service
            .execute(job.job_id, job.suite_id, &app.shutdown_rx)
            .await
    };
    let (response, outcome) = tokio::join!(request, run);

    assert_eq!(outcome.exit_code, ExitCode::AssertionsFailed);
    response.assert_status(StatusCode::OK);
    let frames = parse_frames(&response.text());

    // start, 2 x (case start, case result), report, end
    assert_eq!(frames.len(), 7);
    let ids: Vec<u64> = frames.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, (1..=7).collect::<Vec<u64>>());

    let terminal: Vec<&Value> = frames
        .iter()
        .map(|(_, data)| data)
        .filter(|data| data["status"] == 1)
        .collect();
    assert_eq!(terminal.len(), 1);
    assert_eq!(frames[6].1["status"], 1);
    assert_eq!(frames[6].1["passed"], false);

    // case results carry the verdict of each case
    assert_eq!(frames[2].1["passed"], true);
    assert_eq!(frames[4].1["passed"], false);
    assert!(frames[4].1["message"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_server_shutdown_ends_open_streams() {
    let app = create_test_app().await;
    let db = app.components.db.clone();
    insert_get_case(&db, 1, "/a", 200).await;
    insert_suite(&db, 10, &[1]).await;

    let job: RunSuiteResponseDto = app.server.post("/v1/suites/10/run").await.json();

    let url = format!("/v1/jobs/{}/events", job.job_id);
    let request = async { app.server.get(&url).await };
    let stop = async {
        wait_for_subscriber(&app.channel).await;
        app.shutdown_tx.send(true).unwrap();
    };
    let (response, _) = tokio::join!(request, stop);

    response.assert_status(StatusCode::OK);
    assert!(parse_frames(&response.text()).is_empty());
}
