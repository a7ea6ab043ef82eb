// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Jobs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Jobs::SuiteId).big_integer().not_null())
                    .col(ColumnDef::new(Jobs::Status).string().not_null())
                    .col(ColumnDef::new(Jobs::CaseCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Jobs::AttemptCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Jobs::MaxAttempts).integer().not_null().default(1))
                    .col(ColumnDef::new(Jobs::ExitCode).integer())
                    .col(ColumnDef::new(Jobs::LockToken).uuid())
                    .col(ColumnDef::new(Jobs::LockExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Jobs::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Jobs::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Jobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_status_created_at")
                    .table(Jobs::Table)
                    .col(Jobs::Status)
                    .col(Jobs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_suite_id")
                    .table(Jobs::Table)
                    .col(Jobs::SuiteId)
                    .to_owned(),
            )
            .await?;

        // One row per suite, overwritten on every submission
        manager
            .create_table(
                Table::create()
                    .table(SuiteJobBindings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuiteJobBindings::SuiteId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuiteJobBindings::JobId).uuid().not_null())
                    .col(
                        ColumnDef::new(SuiteJobBindings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SuiteJobBindings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    SuiteId,
    Status,
    CaseCount,
    AttemptCount,
    MaxAttempts,
    ExitCode,
    LockToken,
    LockExpiresAt,
    CreatedAt,
    StartedAt,
    CompletedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SuiteJobBindings {
    Table,
    SuiteId,
    JobId,
    UpdatedAt,
}
