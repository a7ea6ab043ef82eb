// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::job::{Job, JobStatus};
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::infrastructure::database::entities::job as job_entity;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, LockBehavior, LockType},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

/// 作业仓库实现
///
/// 基于SeaORM实现，作业表同时作为持久化队列使用
#[derive(Clone)]
pub struct JobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
    /// 工作器持有作业锁的时长
    lock_duration: Duration,
}

impl JobRepositoryImpl {
    /// 创建新的作业仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    /// * `lock_duration` - 作业锁时长，超过后作业可被重新投递
    ///
    /// # 返回值
    ///
    /// 返回新的作业仓库实例
    pub fn new(db: Arc<DatabaseConnection>, lock_duration: Duration) -> Self {
        Self { db, lock_duration }
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

impl From<job_entity::Model> for Job {
    fn from(model: job_entity::Model) -> Self {
        Self {
            id: model.id,
            suite_id: model.suite_id,
            status: model.status.parse().unwrap_or_default(),
            case_count: model.case_count,
            attempt_count: model.attempt_count,
            max_attempts: model.max_attempts,
            exit_code: model.exit_code,
            submitted_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            updated_at: model.updated_at,
            lock_token: model.lock_token,
            lock_expires_at: model.lock_expires_at,
        }
    }
}

impl From<Job> for job_entity::ActiveModel {
    fn from(job: Job) -> Self {
        Self {
            id: Set(job.id),
            suite_id: Set(job.suite_id),
            status: Set(job.status.to_string()),
            case_count: Set(job.case_count),
            attempt_count: Set(job.attempt_count),
            max_attempts: Set(job.max_attempts),
            exit_code: Set(job.exit_code),
            lock_token: Set(job.lock_token),
            lock_expires_at: Set(job.lock_expires_at),
            created_at: Set(job.submitted_at),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
            updated_at: Set(job.updated_at),
        }
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        let model: job_entity::ActiveModel = job.clone().into();
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn acquire_next(&self, worker_id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let txn = self.db.begin().await?;

        let job = job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(JobStatus::Queued.to_string()))
            .order_by_asc(job_entity::Column::CreatedAt)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .one(&txn)
            .await?;

        let Some(job) = job else {
            txn.commit().await?;
            return Ok(None);
        };

        let acquired_at = now();
        let attempts = job.attempt_count + 1;
        let mut active: job_entity::ActiveModel = job.into();
        active.lock_token = Set(Some(worker_id));
        active.lock_expires_at = Set(Some(acquired_at + self.lock_duration));
        active.status = Set(JobStatus::Active.to_string());
        active.started_at = Set(Some(acquired_at));
        active.attempt_count = Set(attempts);
        active.updated_at = Set(acquired_at);

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(Some(updated.into()))
    }

    async fn renew_lock(&self, id: Uuid, worker_id: Uuid) -> Result<bool, RepositoryError> {
        let renewed_at = now();
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::LockExpiresAt,
                Expr::value(Some(renewed_at + self.lock_duration)),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(renewed_at))
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::LockToken.eq(worker_id))
            .filter(job_entity::Column::Status.eq(JobStatus::Active.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn mark_finished(
        &self,
        id: Uuid,
        worker_id: Uuid,
        status: JobStatus,
        exit_code: i32,
    ) -> Result<(), RepositoryError> {
        let finished_at = now();
        let result = job_entity::Entity::update_many()
            .col_expr(job_entity::Column::Status, Expr::value(status.to_string()))
            .col_expr(job_entity::Column::ExitCode, Expr::value(Some(exit_code)))
            .col_expr(
                job_entity::Column::CompletedAt,
                Expr::value(Some(finished_at)),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(finished_at))
            .col_expr(
                job_entity::Column::LockToken,
                Expr::value(Option::<Uuid>::None),
            )
            .col_expr(
                job_entity::Column::LockExpiresAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::LockToken.eq(worker_id))
            .filter(job_entity::Column::Status.eq(JobStatus::Active.to_string()))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return match self.find_by_id(id).await? {
                Some(_) => Err(RepositoryError::LockLost),
                None => Err(RepositoryError::NotFound),
            };
        }
        Ok(())
    }

    async fn reset_stuck_jobs(&self) -> Result<u64, RepositoryError> {
        let current = now();
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Queued.to_string()),
            )
            .col_expr(
                job_entity::Column::LockToken,
                Expr::value(Option::<Uuid>::None),
            )
            .col_expr(
                job_entity::Column::LockExpiresAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(current))
            .filter(job_entity::Column::Status.eq(JobStatus::Active.to_string()))
            .filter(job_entity::Column::LockExpiresAt.lte(current))
            .filter(
                Expr::col(job_entity::Column::AttemptCount)
                    .lt(Expr::col(job_entity::Column::MaxAttempts)),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn fail_exhausted_jobs(&self) -> Result<u64, RepositoryError> {
        let current = now();
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Failed.to_string()),
            )
            .col_expr(job_entity::Column::CompletedAt, Expr::value(Some(current)))
            .col_expr(job_entity::Column::UpdatedAt, Expr::value(current))
            .col_expr(
                job_entity::Column::LockToken,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(job_entity::Column::Status.eq(JobStatus::Active.to_string()))
            .filter(job_entity::Column::LockExpiresAt.lte(current))
            .filter(
                Expr::col(job_entity::Column::AttemptCount)
                    .gte(Expr::col(job_entity::Column::MaxAttempts)),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}
