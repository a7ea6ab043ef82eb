// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::case::CaseSnapshot;
use crate::domain::models::job::JobMessage;
use crate::domain::repositories::binding_repository::BindingRepository;
use crate::domain::repositories::case_repository::CaseRepository;
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::domain::repositories::suite_repository::SuiteRepository;
use crate::queue::handoff::{HandoffError, HandoffStore};
use crate::queue::job_queue::{JobQueue, QueueError};
use chrono::{DateTime, FixedOffset};
use metrics::counter;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Suite {0} not found")]
    SuiteNotFound(i64),
    #[error("Suite {0} has no runnable cases")]
    EmptySuite(i64),
    #[error("Suite {suite_id} has too many cases ({count})")]
    TooManyCases { suite_id: i64, count: usize },
    #[error("Suite {suite_id} is already running as job {job_id}")]
    AlreadyRunning { suite_id: i64, job_id: Uuid },
    #[error("Handoff error: {0}")]
    Handoff(#[from] HandoffError),
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl SubmitError {
    fn label(&self) -> &'static str {
        match self {
            SubmitError::SuiteNotFound(_) => "suite_not_found",
            SubmitError::EmptySuite(_) => "empty_suite",
            SubmitError::TooManyCases { .. } => "too_many_cases",
            SubmitError::AlreadyRunning { .. } => "already_running",
            SubmitError::Handoff(_) => "handoff",
            SubmitError::Queue(_) => "queue",
            SubmitError::Repository(_) => "repository",
        }
    }
}

fn job_case_count(suite_id: i64, count: usize) -> Result<i32, SubmitError> {
    i32::try_from(count).map_err(|_| SubmitError::TooManyCases { suite_id, count })
}

/// 已提交的作业
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub job_id: Uuid,
    pub suite_id: i64,
    pub case_count: usize,
    pub submitted_at: DateTime<FixedOffset>,
}

/// 提交套件运行
///
/// 捕获用例快照，写入交接存储，入队，最后更新套件绑定。
/// 绑定只在快照与入队都成功之后写入。
pub struct SubmitSuiteUseCase {
    suites: Arc<dyn SuiteRepository>,
    cases: Arc<dyn CaseRepository>,
    jobs: Arc<dyn JobRepository>,
    bindings: Arc<dyn BindingRepository>,
    handoff: Arc<dyn HandoffStore>,
    queue: Arc<dyn JobQueue>,
    single_flight: bool,
}

impl SubmitSuiteUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        suites: Arc<dyn SuiteRepository>,
        cases: Arc<dyn CaseRepository>,
        jobs: Arc<dyn JobRepository>,
        bindings: Arc<dyn BindingRepository>,
        handoff: Arc<dyn HandoffStore>,
        queue: Arc<dyn JobQueue>,
        single_flight: bool,
    ) -> Self {
        Self {
            suites,
            cases,
            jobs,
            bindings,
            handoff,
            queue,
            single_flight,
        }
    }

    /// 提交套件运行
    ///
    /// # 参数
    ///
    /// * `suite_id` - 套件ID
    ///
    /// # 返回值
    ///
    /// * `Ok(SubmittedJob)` - 作业已入队，绑定已更新
    /// * `Err(SubmitError)` - 提交失败，未写入绑定
    pub async fn submit(&self, suite_id: i64) -> Result<SubmittedJob, SubmitError> {
        match self.submit_inner(suite_id).await {
            Ok(job) => {
                counter!("jobs_submitted_total").increment(1);
                Ok(job)
            }
            Err(e) => {
                counter!("jobs_submit_failed_total", "reason" => e.label()).increment(1);
                Err(e)
            }
        }
    }

    async fn submit_inner(&self, suite_id: i64) -> Result<SubmittedJob, SubmitError> {
        let suite = self
            .suites
            .find_by_id(suite_id)
            .await?
            .ok_or(SubmitError::SuiteNotFound(suite_id))?;

        if self.single_flight {
            self.ensure_not_running(suite_id).await?;
        }

        let records = self.cases.find_by_ids(&suite.case_ids).await?;
        let snapshot =
            CaseSnapshot::capture(records).map_err(|_| SubmitError::EmptySuite(suite_id))?;
        let case_count = job_case_count(suite_id, snapshot.len())?;

        let job_id = Uuid::new_v4();
        self.handoff.put(job_id, &snapshot).await?;

        let message = JobMessage {
            job_id,
            suite_id,
            case_count,
        };
        let job = match self.queue.enqueue(message).await {
            Ok(job) => job,
            Err(e) => {
                error!(suite_id, job_id = %job_id, "Failed to enqueue job: {}", e);
                if let Err(discard) = self.handoff.discard(job_id).await {
                    warn!(job_id = %job_id, "Failed to discard case snapshot: {}", discard);
                }
                return Err(e.into());
            }
        };

        // job is already queued at this point and will run regardless
        self.bindings.upsert(suite_id, job_id).await.map_err(|e| {
            error!(suite_id, job_id = %job_id, "Job enqueued but binding failed: {}", e);
            e
        })?;

        info!(suite_id, job_id = %job_id, case_count, "Suite run submitted");
        Ok(SubmittedJob {
            job_id,
            suite_id,
            case_count: snapshot.len(),
            submitted_at: job.submitted_at,
        })
    }

    async fn ensure_not_running(&self, suite_id: i64) -> Result<(), SubmitError> {
        let Some(binding) = self.bindings.find_by_suite(suite_id).await? else {
            return Ok(());
        };
        match self.jobs.find_by_id(binding.job_id).await? {
            Some(job) if job.is_in_flight() => Err(SubmitError::AlreadyRunning {
                suite_id,
                job_id: job.id,
            }),
            _ => Ok(()),
        }
    }
}
