// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::binding::SuiteJobBinding;
use crate::domain::repositories::binding_repository::BindingRepository;
use crate::domain::repositories::job_repository::RepositoryError;
use crate::infrastructure::database::entities::suite_job_binding as binding_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{sea_query::OnConflict, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;
use uuid::Uuid;

/// 绑定仓库实现
#[derive(Clone)]
pub struct BindingRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl BindingRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<binding_entity::Model> for SuiteJobBinding {
    fn from(model: binding_entity::Model) -> Self {
        Self {
            suite_id: model.suite_id,
            job_id: model.job_id,
            updated_at: model.updated_at,
        }
    }
}

#[async_trait]
impl BindingRepository for BindingRepositoryImpl {
    async fn upsert(
        &self,
        suite_id: i64,
        job_id: Uuid,
    ) -> Result<SuiteJobBinding, RepositoryError> {
        let updated_at: DateTime<FixedOffset> = Utc::now().into();
        let model = binding_entity::ActiveModel {
            suite_id: Set(suite_id),
            job_id: Set(job_id),
            updated_at: Set(updated_at),
        };

        // last write wins
        binding_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(binding_entity::Column::SuiteId)
                    .update_columns([
                        binding_entity::Column::JobId,
                        binding_entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(SuiteJobBinding {
            suite_id,
            job_id,
            updated_at,
        })
    }

    async fn find_by_suite(
        &self,
        suite_id: i64,
    ) -> Result<Option<SuiteJobBinding>, RepositoryError> {
        let model = binding_entity::Entity::find_by_id(suite_id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }
}
