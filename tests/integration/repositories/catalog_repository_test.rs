// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{
    insert_case, insert_environment, insert_get_case, insert_suite, test_db,
};
use apitestrs::domain::models::case::ParamType;
use apitestrs::domain::models::suite::ExecutionState;
use apitestrs::domain::repositories::binding_repository::BindingRepository;
use apitestrs::domain::repositories::case_repository::CaseRepository;
use apitestrs::domain::repositories::environment_repository::EnvironmentRepository;
use apitestrs::domain::repositories::job_repository::RepositoryError;
use apitestrs::domain::repositories::suite_repository::SuiteRepository;
use apitestrs::infrastructure::repositories::binding_repo_impl::BindingRepositoryImpl;
use apitestrs::infrastructure::repositories::catalog_repo_impl::CatalogRepositoryImpl;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_cases_follow_suite_order() {
    let db = Arc::new(test_db().await);
    insert_get_case(&db, 1, "/a", 200).await;
    insert_get_case(&db, 2, "/b", 200).await;
    insert_case(&db, 3, "POST", "/c", "json", json!({"name": "x"}), 201).await;
    let repo = CatalogRepositoryImpl::new(db);

    // unknown ids are skipped, repeated ids run twice
    let cases = repo.find_by_ids(&[3, 1, 99, 3]).await.unwrap();
    let ids: Vec<i64> = cases.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 1, 3]);

    assert_eq!(cases[0].request_param_type, ParamType::Json);
    assert_eq!(cases[0].request_param, json!({"name": "x"}));
    assert_eq!(cases[0].expected_status_code, 201);
    assert_eq!(cases[1].request_param_type, ParamType::None);

    assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_suite_state_round_trip() {
    let db = Arc::new(test_db().await);
    insert_suite(&db, 7, &[1, 2]).await;
    let repo = CatalogRepositoryImpl::new(db);

    let suite = repo.find_by_id(7).await.unwrap().unwrap();
    assert_eq!(suite.case_ids, vec![1, 2]);
    assert_eq!(suite.execution_state, ExecutionState::NotExecuted);

    repo.update_execution_state(7, ExecutionState::Failed)
        .await
        .unwrap();
    let suite = repo.find_by_id(7).await.unwrap().unwrap();
    assert_eq!(suite.execution_state, ExecutionState::Failed);

    assert!(repo.find_by_id(8).await.unwrap().is_none());
    let missing = repo
        .update_execution_state(8, ExecutionState::Succeeded)
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn test_current_environment_with_headers() {
    let db = Arc::new(test_db().await);
    let repo = CatalogRepositoryImpl::new(db.clone());
    assert!(repo.find_current().await.unwrap().is_none());

    insert_environment(&db, "http://staging.local", json!({"x-api-key": "secret"})).await;
    let env = repo.find_current().await.unwrap().unwrap();
    assert_eq!(env.base_url, "http://staging.local");
    assert_eq!(env.headers.get("x-api-key").map(String::as_str), Some("secret"));
    assert!(env.ensure_valid().is_ok());
}

#[tokio::test]
async fn test_binding_is_overwritten_per_suite() {
    let db = Arc::new(test_db().await);
    let repo = BindingRepositoryImpl::new(db);
    assert!(repo.find_by_suite(1).await.unwrap().is_none());

    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    repo.upsert(1, first).await.unwrap();
    repo.upsert(1, second).await.unwrap();
    repo.upsert(2, first).await.unwrap();

    assert_eq!(repo.find_by_suite(1).await.unwrap().unwrap().job_id, second);
    assert_eq!(repo.find_by_suite(2).await.unwrap().unwrap().job_id, first);
}
