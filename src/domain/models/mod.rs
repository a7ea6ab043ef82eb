// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 用例快照（case）：提交时按值捕获的用例定义
/// - 套件（suite）：用例集合及其执行状态
/// - 作业（job）：一次执行尝试、队列消息与退出码
/// - 进度事件（event）：执行过程中发布的生命周期消息
/// - 目标环境（environment）：被测系统的地址与公共请求头
/// - 绑定（binding）：套件到最近一次作业的映射
/// - 错误（error）：领域规则校验错误
pub mod binding;
pub mod case;
pub mod environment;
pub mod error;
pub mod event;
pub mod job;
pub mod suite;
