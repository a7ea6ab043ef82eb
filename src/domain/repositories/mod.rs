// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层的仓库接口，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 绑定仓库（binding_repository）：套件到最近作业的映射
/// - 用例仓库（case_repository）：按顺序读取用例定义
/// - 环境仓库（environment_repository）：读取当前目标环境
/// - 作业仓库（job_repository）：作业持久化与队列锁定
/// - 存储仓库（storage_repository）：执行产物的存储
/// - 套件仓库（suite_repository）：套件读取与执行状态更新
pub mod binding_repository;
pub mod case_repository;
pub mod environment_repository;
pub mod job_repository;
pub mod storage_repository;
pub mod suite_repository;

pub use job_repository::RepositoryError;
