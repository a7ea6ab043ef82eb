// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::environment::TargetEnvironment;
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;

/// 目标环境仓库特质
#[async_trait]
pub trait EnvironmentRepository: Send + Sync {
    /// 查找当前启用的目标环境
    async fn find_current(&self) -> Result<Option<TargetEnvironment>, RepositoryError>;
}
