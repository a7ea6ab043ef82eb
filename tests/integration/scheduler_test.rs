// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::test_db;
use apitestrs::domain::models::job::{Job, JobMessage, JobStatus};
use apitestrs::domain::repositories::job_repository::JobRepository;
use apitestrs::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use apitestrs::queue::scheduler::JobScheduler;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

async fn abandoned_job(repo: &JobRepositoryImpl, max_attempts: i32) -> Uuid {
    let message = JobMessage {
        job_id: Uuid::new_v4(),
        suite_id: 1,
        case_count: 1,
    };
    let job = repo.create(&Job::new(message, max_attempts)).await.unwrap();
    repo.acquire_next(Uuid::new_v4()).await.unwrap();
    job.id
}

#[tokio::test]
async fn test_maintenance_requeues_and_exhausts() {
    let repo = Arc::new(JobRepositoryImpl::new(
        Arc::new(test_db().await),
        chrono::Duration::seconds(-1),
    ));
    let retryable = abandoned_job(&repo, 3).await;
    let exhausted = abandoned_job(&repo, 1).await;

    let scheduler = JobScheduler::new(repo.clone(), Duration::from_secs(60));
    let report = scheduler.run_maintenance().await.unwrap();
    assert_eq!(report.requeued, 1);
    assert_eq!(report.exhausted, 1);

    let retryable = repo.find_by_id(retryable).await.unwrap().unwrap();
    let exhausted = repo.find_by_id(exhausted).await.unwrap().unwrap();
    assert_eq!(retryable.status, JobStatus::Queued);
    assert_eq!(exhausted.status, JobStatus::Failed);
}

#[tokio::test]
async fn test_scheduler_stops_on_shutdown() {
    let repo = Arc::new(JobRepositoryImpl::new(
        Arc::new(test_db().await),
        chrono::Duration::seconds(-1),
    ));
    let job_id = abandoned_job(&repo, 2).await;

    let (tx, rx) = watch::channel(false);
    let handle = JobScheduler::new(repo.clone(), Duration::from_millis(20)).start(rx);

    // the first tick fires immediately
    tokio::time::sleep(Duration::from_millis(100)).await;
    let job = repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Queued);

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
}
