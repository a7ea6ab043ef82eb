// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::binding::SuiteJobBinding;
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 套件作业绑定仓库特质
#[async_trait]
pub trait BindingRepository: Send + Sync {
    /// 写入绑定，已存在时覆盖
    async fn upsert(
        &self,
        suite_id: i64,
        job_id: Uuid,
    ) -> Result<SuiteJobBinding, RepositoryError>;
    /// 查找套件当前绑定的作业
    async fn find_by_suite(
        &self,
        suite_id: i64,
    ) -> Result<Option<SuiteJobBinding>, RepositoryError>;
}
