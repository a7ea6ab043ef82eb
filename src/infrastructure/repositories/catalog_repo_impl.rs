// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::case::CaseRecord;
use crate::domain::models::environment::TargetEnvironment;
use crate::domain::models::suite::{ExecutionState, Suite};
use crate::domain::repositories::case_repository::CaseRepository;
use crate::domain::repositories::environment_repository::EnvironmentRepository;
use crate::domain::repositories::job_repository::RepositoryError;
use crate::domain::repositories::suite_repository::SuiteRepository;
use crate::infrastructure::database::entities::{
    environment as environment_entity, test_case as case_entity, test_suite as suite_entity,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 用例、套件与目标环境的只读访问
///
/// 这三张表由后台管理端维护，执行流水线只读取它们，
/// 唯一的写操作是结果终结器更新套件执行状态。
#[derive(Clone)]
pub struct CatalogRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl CatalogRepositoryImpl {
    /// 创建新的目录仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<case_entity::Model> for CaseRecord {
    type Error = RepositoryError;

    fn try_from(model: case_entity::Model) -> Result<Self, Self::Error> {
        let expected_status_code = u16::try_from(model.expected_status_code).map_err(|_| {
            RepositoryError::Corrupted(format!(
                "case {} has expected status {}",
                model.id, model.expected_status_code
            ))
        })?;
        Ok(Self {
            id: model.id,
            title: model.title,
            description: model.description,
            module: model.module,
            editor: model.editor,
            request_method: model.request_method,
            request_path: model.request_path,
            request_param_type: model.request_param_type.parse().unwrap_or_default(),
            request_param: model.request_param,
            expected_status_code,
        })
    }
}

impl TryFrom<suite_entity::Model> for Suite {
    type Error = RepositoryError;

    fn try_from(model: suite_entity::Model) -> Result<Self, Self::Error> {
        let case_ids: Vec<i64> = serde_json::from_value(model.case_ids).map_err(|e| {
            RepositoryError::Corrupted(format!("suite {} case_ids: {}", model.id, e))
        })?;
        Ok(Self {
            id: model.id,
            name: model.name,
            description: model.description,
            case_ids,
            execution_state: ExecutionState::from_i32(model.execution_state).unwrap_or_default(),
        })
    }
}

impl TryFrom<environment_entity::Model> for TargetEnvironment {
    type Error = RepositoryError;

    fn try_from(model: environment_entity::Model) -> Result<Self, Self::Error> {
        let headers: HashMap<String, String> = if model.headers.is_null() {
            HashMap::new()
        } else {
            serde_json::from_value(model.headers).map_err(|e| {
                RepositoryError::Corrupted(format!("environment {} headers: {}", model.id, e))
            })?
        };
        Ok(Self {
            id: model.id,
            name: model.name,
            base_url: model.base_url,
            headers,
            is_current: model.is_current,
        })
    }
}

#[async_trait]
impl CaseRepository for CatalogRepositoryImpl {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<CaseRecord>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = case_entity::Entity::find()
            .filter(case_entity::Column::Id.is_in(ids.iter().copied()))
            .all(self.db.as_ref())
            .await?;

        let by_id: HashMap<i64, case_entity::Model> =
            models.into_iter().map(|m| (m.id, m)).collect();

        // the suite's order wins over the storage order; duplicates run twice
        ids.iter()
            .filter_map(|id| by_id.get(id).cloned())
            .map(CaseRecord::try_from)
            .collect()
    }
}

#[async_trait]
impl SuiteRepository for CatalogRepositoryImpl {
    async fn find_by_id(&self, id: i64) -> Result<Option<Suite>, RepositoryError> {
        let model = suite_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(Suite::try_from).transpose()
    }

    async fn update_execution_state(
        &self,
        id: i64,
        state: ExecutionState,
    ) -> Result<(), RepositoryError> {
        let updated_at: DateTime<FixedOffset> = Utc::now().into();
        let result = suite_entity::Entity::update_many()
            .col_expr(
                suite_entity::Column::ExecutionState,
                Expr::value(state.as_i32()),
            )
            .col_expr(suite_entity::Column::UpdatedAt, Expr::value(updated_at))
            .filter(suite_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl EnvironmentRepository for CatalogRepositoryImpl {
    async fn find_current(&self) -> Result<Option<TargetEnvironment>, RepositoryError> {
        let model = environment_entity::Entity::find()
            .filter(environment_entity::Column::IsCurrent.eq(true))
            .order_by_desc(environment_entity::Column::Id)
            .one(self.db.as_ref())
            .await?;

        model.map(TargetEnvironment::try_from).transpose()
    }
}
