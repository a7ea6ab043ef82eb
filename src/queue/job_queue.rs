// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{ExitCode, Job, JobMessage, JobStatus};
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 底层存储不可用
    #[error("Queue broker unavailable: {0}")]
    Broker(RepositoryError),
    /// 作业锁已被回收，调用方不再持有该作业
    #[error("Job {0} is no longer held by this worker")]
    LockLost(Uuid),
}

impl From<RepositoryError> for QueueError {
    fn from(err: RepositoryError) -> Self {
        QueueError::Broker(err)
    }
}

/// 作业队列特质
///
/// 提交立即返回；每条消息至少投递一次，由单个工作器处理
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 入队作业
    async fn enqueue(&self, message: JobMessage) -> Result<Job, QueueError>;

    /// 为指定工作器取出下一个作业
    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<Job>, QueueError>;

    /// 延长工作器对作业的持有，返回 `false` 表示锁已丢失
    async fn heartbeat(&self, job_id: Uuid, worker_id: Uuid) -> Result<bool, QueueError>;

    /// 确认作业结束并记录退出码
    async fn complete(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        exit_code: ExitCode,
    ) -> Result<(), QueueError>;

    /// 标记作业失败并记录退出码
    async fn fail(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        exit_code: ExitCode,
    ) -> Result<(), QueueError>;
}

/// 基于作业表的持久化队列
pub struct PostgresJobQueue<R: JobRepository> {
    /// 作业仓库
    repository: Arc<R>,
    /// 每个作业的最大投递次数
    max_attempts: i32,
}

impl<R: JobRepository> PostgresJobQueue<R> {
    /// 创建新的作业队列实例
    ///
    /// # 参数
    ///
    /// * `repository` - 作业仓库
    /// * `max_attempts` - 最大投递次数
    ///
    /// # 返回值
    ///
    /// 返回新的作业队列实例
    pub fn new(repository: Arc<R>, max_attempts: i32) -> Self {
        Self {
            repository,
            max_attempts,
        }
    }
}

#[async_trait]
impl<R: JobRepository> JobQueue for PostgresJobQueue<R> {
    /// 入队作业
    ///
    /// # 参数
    ///
    /// * `message` - 队列消息
    ///
    /// # 返回值
    ///
    /// * `Ok(Job)` - 已持久化的作业
    /// * `Err(QueueError)` - 存储不可用
    async fn enqueue(&self, message: JobMessage) -> Result<Job, QueueError> {
        let job = Job::new(message, self.max_attempts);
        let created = self.repository.create(&job).await?;
        Ok(created)
    }

    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<Job>, QueueError> {
        let job = self.repository.acquire_next(worker_id).await?;
        Ok(job)
    }

    async fn heartbeat(&self, job_id: Uuid, worker_id: Uuid) -> Result<bool, QueueError> {
        Ok(self.repository.renew_lock(job_id, worker_id).await?)
    }

    /// 确认作业结束
    ///
    /// 只有能映射到套件状态的退出码（0 与 1）记为已完成，其余转为失败
    async fn complete(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        exit_code: ExitCode,
    ) -> Result<(), QueueError> {
        if exit_code.suite_state().is_none() {
            return self.fail(job_id, worker_id, exit_code).await;
        }
        self.finish(job_id, worker_id, JobStatus::Completed, exit_code)
            .await
    }

    async fn fail(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        exit_code: ExitCode,
    ) -> Result<(), QueueError> {
        self.finish(job_id, worker_id, JobStatus::Failed, exit_code)
            .await
    }
}

impl<R: JobRepository> PostgresJobQueue<R> {
    async fn finish(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        status: JobStatus,
        exit_code: ExitCode,
    ) -> Result<(), QueueError> {
        match self
            .repository
            .mark_finished(job_id, worker_id, status, exit_code.code())
            .await
        {
            Ok(()) => Ok(()),
            Err(RepositoryError::LockLost) => Err(QueueError::LockLost(job_id)),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<T: JobQueue + ?Sized> JobQueue for Arc<T> {
    async fn enqueue(&self, message: JobMessage) -> Result<Job, QueueError> {
        (**self).enqueue(message).await
    }

    async fn dequeue(&self, worker_id: Uuid) -> Result<Option<Job>, QueueError> {
        (**self).dequeue(worker_id).await
    }

    async fn heartbeat(&self, job_id: Uuid, worker_id: Uuid) -> Result<bool, QueueError> {
        (**self).heartbeat(job_id, worker_id).await
    }

    async fn complete(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        exit_code: ExitCode,
    ) -> Result<(), QueueError> {
        (**self).complete(job_id, worker_id, exit_code).await
    }

    async fn fail(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        exit_code: ExitCode,
    ) -> Result<(), QueueError> {
        (**self).fail(job_id, worker_id, exit_code).await
    }
}
