// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::test_db;
use apitestrs::domain::models::job::{ExitCode, Job, JobMessage, JobStatus};
use apitestrs::domain::repositories::job_repository::{JobRepository, RepositoryError};
use apitestrs::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use apitestrs::queue::job_queue::{JobQueue, PostgresJobQueue, QueueError};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn message(suite_id: i64) -> JobMessage {
    JobMessage {
        job_id: Uuid::new_v4(),
        suite_id,
        case_count: 2,
    }
}

async fn repo(lock: chrono::Duration) -> Arc<JobRepositoryImpl> {
    Arc::new(JobRepositoryImpl::new(Arc::new(test_db().await), lock))
}

#[tokio::test]
async fn test_acquire_next_takes_oldest_queued_job() {
    let repo = repo(chrono::Duration::seconds(60)).await;
    let first = repo.create(&Job::new(message(1), 1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = repo.create(&Job::new(message(2), 1)).await.unwrap();

    let worker = Uuid::new_v4();
    let acquired = repo.acquire_next(worker).await.unwrap().unwrap();
    assert_eq!(acquired.id, first.id);
    assert_eq!(acquired.status, JobStatus::Active);
    assert_eq!(acquired.attempt_count, 1);
    assert_eq!(acquired.lock_token, Some(worker));
    assert!(acquired.started_at.is_some());

    let next = repo.acquire_next(Uuid::new_v4()).await.unwrap().unwrap();
    assert_eq!(next.id, second.id);

    assert!(repo.acquire_next(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_mark_finished_records_exit_code_and_releases_lock() {
    let repo = repo(chrono::Duration::seconds(60)).await;
    let job = repo.create(&Job::new(message(1), 1)).await.unwrap();
    let worker = Uuid::new_v4();
    repo.acquire_next(worker).await.unwrap();

    repo.mark_finished(job.id, worker, JobStatus::Completed, 1)
        .await
        .unwrap();

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.exit_code, Some(1));
    assert!(stored.lock_token.is_none());
    assert!(stored.completed_at.is_some());
    assert!(!stored.is_in_flight());
}

#[tokio::test]
async fn test_mark_finished_unknown_job_is_not_found() {
    let repo = repo(chrono::Duration::seconds(60)).await;
    let result = repo
        .mark_finished(Uuid::new_v4(), Uuid::new_v4(), JobStatus::Failed, 3)
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn test_expired_lock_is_requeued_while_attempts_remain() {
    // a negative lock duration makes every acquired lock already expired
    let repo = repo(chrono::Duration::seconds(-1)).await;
    let job = repo.create(&Job::new(message(1), 2)).await.unwrap();
    repo.acquire_next(Uuid::new_v4()).await.unwrap();

    assert_eq!(repo.fail_exhausted_jobs().await.unwrap(), 0);
    assert_eq!(repo.reset_stuck_jobs().await.unwrap(), 1);

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Queued);
    assert!(stored.lock_token.is_none());

    let retried = repo.acquire_next(Uuid::new_v4()).await.unwrap().unwrap();
    assert_eq!(retried.id, job.id);
    assert_eq!(retried.attempt_count, 2);
}

#[tokio::test]
async fn test_expired_lock_fails_job_once_attempts_are_exhausted() {
    let repo = repo(chrono::Duration::seconds(-1)).await;
    let job = repo.create(&Job::new(message(1), 1)).await.unwrap();
    repo.acquire_next(Uuid::new_v4()).await.unwrap();

    assert_eq!(repo.reset_stuck_jobs().await.unwrap(), 0);
    assert_eq!(repo.fail_exhausted_jobs().await.unwrap(), 1);

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert!(stored.exit_code.is_none());
}

#[tokio::test]
async fn test_live_lock_is_left_alone() {
    let repo = repo(chrono::Duration::seconds(60)).await;
    repo.create(&Job::new(message(1), 3)).await.unwrap();
    repo.acquire_next(Uuid::new_v4()).await.unwrap();

    assert_eq!(repo.reset_stuck_jobs().await.unwrap(), 0);
    assert_eq!(repo.fail_exhausted_jobs().await.unwrap(), 0);
}

#[tokio::test]
async fn test_queue_maps_exit_codes_to_job_status() {
    let repo = repo(chrono::Duration::seconds(60)).await;
    let queue = PostgresJobQueue::new(repo.clone(), 1);

    let passed = queue.enqueue(message(1)).await.unwrap();
    let failed = queue.enqueue(message(2)).await.unwrap();
    let crashed = queue.enqueue(message(3)).await.unwrap();
    assert_eq!(passed.status, JobStatus::Queued);

    let worker = Uuid::new_v4();
    for _ in 0..3 {
        queue.dequeue(worker).await.unwrap().unwrap();
    }

    queue
        .complete(passed.id, worker, ExitCode::AllPassed)
        .await
        .unwrap();
    queue
        .complete(failed.id, worker, ExitCode::AssertionsFailed)
        .await
        .unwrap();
    // completing with an unmapped code records a failure instead
    queue
        .complete(crashed.id, worker, ExitCode::InternalError)
        .await
        .unwrap();

    let passed = repo.find_by_id(passed.id).await.unwrap().unwrap();
    let failed = repo.find_by_id(failed.id).await.unwrap().unwrap();
    let crashed = repo.find_by_id(crashed.id).await.unwrap().unwrap();
    assert_eq!(passed.status, JobStatus::Completed);
    assert_eq!(passed.exit_code, Some(0));
    assert_eq!(failed.status, JobStatus::Completed);
    assert_eq!(failed.exit_code, Some(1));
    assert_eq!(crashed.status, JobStatus::Failed);
    assert_eq!(crashed.exit_code, Some(3));
}

#[tokio::test]
async fn test_renew_lock_only_for_current_holder() {
    let repo = repo(chrono::Duration::seconds(60)).await;
    let job = repo.create(&Job::new(message(1), 1)).await.unwrap();
    let holder = Uuid::new_v4();
    let acquired = repo.acquire_next(holder).await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(repo.renew_lock(job.id, holder).await.unwrap());
    assert!(!repo.renew_lock(job.id, Uuid::new_v4()).await.unwrap());

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert!(stored.lock_expires_at > acquired.lock_expires_at);

    repo.mark_finished(job.id, holder, JobStatus::Completed, 0)
        .await
        .unwrap();
    assert!(!repo.renew_lock(job.id, holder).await.unwrap());
}

#[tokio::test]
async fn test_stale_holder_cannot_finish_redelivered_job() {
    let repo = repo(chrono::Duration::seconds(-1)).await;
    let job = repo.create(&Job::new(message(1), 2)).await.unwrap();

    let stale = Uuid::new_v4();
    repo.acquire_next(stale).await.unwrap();
    assert_eq!(repo.reset_stuck_jobs().await.unwrap(), 1);
    let current = Uuid::new_v4();
    repo.acquire_next(current).await.unwrap().unwrap();

    assert!(!repo.renew_lock(job.id, stale).await.unwrap());
    let result = repo
        .mark_finished(job.id, stale, JobStatus::Completed, 0)
        .await;
    assert!(matches!(result, Err(RepositoryError::LockLost)));

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Active);
    assert_eq!(stored.lock_token, Some(current));

    repo.mark_finished(job.id, current, JobStatus::Completed, 1)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_exhausted_job_is_not_overwritten_by_its_former_holder() {
    let repo = repo(chrono::Duration::seconds(-1)).await;
    let queue = PostgresJobQueue::new(repo.clone(), 1);
    let job = queue.enqueue(message(1)).await.unwrap();

    let holder = Uuid::new_v4();
    queue.dequeue(holder).await.unwrap().unwrap();
    assert_eq!(repo.fail_exhausted_jobs().await.unwrap(), 1);

    assert!(!queue.heartbeat(job.id, holder).await.unwrap());
    let result = queue.complete(job.id, holder, ExitCode::AllPassed).await;
    assert!(matches!(result, Err(QueueError::LockLost(id)) if id == job.id));

    let stored = repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert!(stored.exit_code.is_none());
}
