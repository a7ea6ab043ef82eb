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
        // Test case definitions, owned by the CRUD backend
        manager
            .create_table(
                Table::create()
                    .table(TestCases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCases::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCases::Title).string().not_null())
                    .col(ColumnDef::new(TestCases::Description).text().not_null().default(""))
                    .col(ColumnDef::new(TestCases::Module).string().not_null().default(""))
                    .col(ColumnDef::new(TestCases::Editor).string().not_null().default(""))
                    .col(ColumnDef::new(TestCases::RequestMethod).string().not_null())
                    .col(ColumnDef::new(TestCases::RequestPath).string().not_null())
                    .col(
                        ColumnDef::new(TestCases::RequestParamType)
                            .string()
                            .not_null()
                            .default("params"),
                    )
                    .col(ColumnDef::new(TestCases::RequestParam).json().not_null())
                    .col(
                        ColumnDef::new(TestCases::ExpectedStatusCode)
                            .integer()
                            .not_null()
                            .default(200),
                    )
                    .col(
                        ColumnDef::new(TestCases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TestCases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TestSuites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestSuites::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestSuites::Name).string().not_null())
                    .col(ColumnDef::new(TestSuites::Description).text().not_null().default(""))
                    .col(ColumnDef::new(TestSuites::CaseIds).json().not_null())
                    // 0 = not executed, 1 = succeeded, 2 = failed
                    .col(
                        ColumnDef::new(TestSuites::ExecutionState)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TestSuites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TestSuites::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Environments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Environments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Environments::Name).string().not_null())
                    .col(ColumnDef::new(Environments::BaseUrl).string().not_null())
                    .col(ColumnDef::new(Environments::Headers).json().not_null())
                    .col(
                        ColumnDef::new(Environments::IsCurrent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Environments::CreatedAt)
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
                    .name("idx_environments_is_current")
                    .table(Environments::Table)
                    .col(Environments::IsCurrent)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Environments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestSuites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TestCases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestCases {
    Table,
    Id,
    Title,
    Description,
    Module,
    Editor,
    RequestMethod,
    RequestPath,
    RequestParamType,
    RequestParam,
    ExpectedStatusCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TestSuites {
    Table,
    Id,
    Name,
    Description,
    CaseIds,
    ExecutionState,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Environments {
    Table,
    Id,
    Name,
    BaseUrl,
    Headers,
    IsCurrent,
    CreatedAt,
}
