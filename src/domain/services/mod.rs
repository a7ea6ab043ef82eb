// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 产物写入（artifact_writer）：保存每个用例的原始执行产物
/// - 执行服务（execution_service）：工作器执行一个作业的完整流程
/// - 报告生成（report_builder）：报告生成器抽象
/// - 结果终结（result_finalizer）：退出码到套件执行状态的映射与写回
/// - 软断言（soft_assertions）：记录失败但不中断执行的状态码断言
pub mod artifact_writer;
pub mod execution_service;
pub mod report_builder;
pub mod result_finalizer;
pub mod soft_assertions;
