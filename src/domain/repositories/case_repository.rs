// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::case::CaseRecord;
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;

/// 用例仓库特质
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// 按给定顺序加载用例，不存在的ID会被跳过
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<CaseRecord>, RepositoryError>;
}
