// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::suite::{ExecutionState, Suite};
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;

/// 套件仓库特质
#[async_trait]
pub trait SuiteRepository: Send + Sync {
    /// 根据ID查找套件
    async fn find_by_id(&self, id: i64) -> Result<Option<Suite>, RepositoryError>;
    /// 更新套件执行状态，套件不存在时返回 `NotFound`
    async fn update_execution_state(
        &self,
        id: i64,
        state: ExecutionState,
    ) -> Result<(), RepositoryError>;
}
