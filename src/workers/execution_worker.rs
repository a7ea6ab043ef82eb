// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Job;
use crate::domain::services::execution_service::ExecutionService;
use crate::domain::services::result_finalizer::{FinalizeError, ResultFinalizer};
use crate::queue::job_queue::{JobQueue, QueueError};
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// 执行工作器
///
/// 从队列取出作业，执行后把退出码交给结果终结器，再向队列确认。
/// 执行期间按续锁间隔延长作业锁；锁一旦丢失，本工作器不再终结该作业。
/// 空闲时按轮询间隔等待，关闭信号到达后在当前作业结束时退出。
pub struct ExecutionWorker {
    worker_id: Uuid,
    name: String,
    queue: Arc<dyn JobQueue>,
    service: Arc<ExecutionService>,
    finalizer: Arc<ResultFinalizer>,
    poll_interval: Duration,
    heartbeat_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl ExecutionWorker {
    /// 创建新的执行工作器
    ///
    /// # 参数
    ///
    /// * `queue` - 作业队列
    /// * `service` - 执行服务
    /// * `finalizer` - 结果终结器
    /// * `poll_interval` - 空闲轮询间隔
    /// * `heartbeat_interval` - 续锁间隔
    /// * `shutdown` - 关闭信号
    pub fn new(
        queue: Arc<dyn JobQueue>,
        service: Arc<ExecutionService>,
        finalizer: Arc<ResultFinalizer>,
        poll_interval: Duration,
        heartbeat_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let worker_id = Uuid::new_v4();
        Self {
            worker_id,
            name: format!("execution-worker-{}", worker_id),
            queue,
            service,
            finalizer,
            poll_interval,
            heartbeat_interval,
            shutdown,
        }
    }

    pub fn worker_id(&self) -> Uuid {
        self.worker_id
    }

    /// 处理下一个作业
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 处理了一个作业
    /// * `Ok(false)` - 队列为空
    pub async fn process_next_job(&self) -> Result<bool, WorkerError> {
        let Some(job) = self.queue.dequeue(self.worker_id).await? else {
            return Ok(false);
        };
        self.process_job(job).await?;
        Ok(true)
    }

    #[instrument(
        skip(self, job),
        fields(job_id = %job.id, suite_id = job.suite_id, attempt = job.attempt_count)
    )]
    async fn process_job(&self, job: Job) -> Result<(), WorkerError> {
        info!("Processing job");

        let execution = self.service.execute(job.id, job.suite_id, &self.shutdown);
        tokio::pin!(execution);

        let mut ticker = interval(self.heartbeat_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        let mut lock_held = true;
        let outcome = loop {
            tokio::select! {
                outcome = &mut execution => break outcome,
                _ = ticker.tick(), if lock_held => {
                    lock_held = self.renew_lock(job.id).await;
                }
            }
        };

        if !lock_held {
            warn!(exit_code = outcome.exit_code.code(), "Job lock lost, result discarded");
            return Ok(());
        }

        match self
            .finalizer
            .finalize(outcome.exit_code.code(), outcome.suite_id)
            .await
        {
            Ok(state) => info!(state = %state, "Suite finalized"),
            // logged and counted by the finalizer
            Err(FinalizeError::UnmappedExitCode { .. }) => {}
            Err(e) => error!("Failed to finalize suite: {}", e),
        }

        let acknowledged = if outcome.exit_code.suite_state().is_some() {
            self.queue
                .complete(job.id, self.worker_id, outcome.exit_code)
                .await
        } else {
            self.queue
                .fail(job.id, self.worker_id, outcome.exit_code)
                .await
        };
        match acknowledged {
            Err(QueueError::LockLost(_)) => {
                warn!("Job lock lost before acknowledgement");
                Ok(())
            }
            other => Ok(other?),
        }
    }

    /// 续锁，返回 `false` 表示锁已被回收
    ///
    /// 存储暂时不可用时视为仍持有，下次续锁再确认
    async fn renew_lock(&self, job_id: Uuid) -> bool {
        match self.queue.heartbeat(job_id, self.worker_id).await {
            Ok(held) => held,
            Err(e) => {
                warn!("Failed to renew job lock: {}", e);
                true
            }
        }
    }

    /// 空闲等待，返回 `false` 表示应当退出
    async fn idle(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = sleep(self.poll_interval) => true,
            changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
        }
    }
}

#[async_trait]
impl Worker for ExecutionWorker {
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Execution worker {} started", self.worker_id);
        let mut shutdown = self.shutdown.clone();

        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.process_next_job().await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => error!("Error processing job: {}", e),
            }
            if !self.idle(&mut shutdown).await {
                break;
            }
        }

        info!("Execution worker {} stopped", self.worker_id);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
