// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 迁移命令行入口
///
/// 创建用例目录表、作业表与套件绑定表，`DATABASE_URL` 指定目标数据库
#[async_std::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
