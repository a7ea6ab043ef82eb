// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 领域层抽象接口的具体技术实现。
///
/// 包含的子模块：
/// - 缓存（cache）：Redis 客户端、事件通道与快照交接存储
/// - 数据库（database）：数据库连接和实体映射
/// - 指标（metrics）：Prometheus 导出器
/// - 报告（report_builder）：调用外部报告生成器
/// - 仓库实现（repositories）：领域仓库接口的实现
/// - 存储（storage）：执行产物的文件存储
pub mod cache;
pub mod database;
pub mod metrics;
pub mod report_builder;
pub mod repositories;
pub mod storage;
