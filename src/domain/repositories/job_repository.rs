// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{Job, JobStatus};
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 持久化数据无法解析
    #[error("Corrupted record: {0}")]
    Corrupted(String),
    /// 作业锁已不归调用方持有
    #[error("Job lock no longer held")]
    LockLost,
}

/// 作业仓库特质
///
/// 定义作业数据访问接口，作业表同时充当持久化队列
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建新作业
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError>;
    /// 根据ID查找作业
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 锁定下一个排队中的作业并标记为执行中
    async fn acquire_next(&self, worker_id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 延长工作器持有的作业锁，锁已丢失时返回 `false`
    async fn renew_lock(&self, id: Uuid, worker_id: Uuid) -> Result<bool, RepositoryError>;
    /// 记录作业的结束状态与退出码，仅锁持有者可以写入
    async fn mark_finished(
        &self,
        id: Uuid,
        worker_id: Uuid,
        status: JobStatus,
        exit_code: i32,
    ) -> Result<(), RepositoryError>;
    /// 将锁已过期且仍有剩余投递次数的作业重新入队
    async fn reset_stuck_jobs(&self) -> Result<u64, RepositoryError>;
    /// 将锁已过期且投递次数耗尽的作业标记为失败
    async fn fail_exhausted_jobs(&self) -> Result<u64, RepositoryError>;
}
