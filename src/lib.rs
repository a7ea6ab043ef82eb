// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 套件提交用例与响应 DTO
pub mod application;

/// 进程装配
pub mod bootstrap;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 向目标环境发送用例请求
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、Redis、存储和报告生成
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和事件流
pub mod presentation;

/// 队列模块
///
/// 作业队列、快照交接与维护调度
pub mod queue;

/// 进度事件的发布与订阅
pub mod streaming;

/// 工具模块
///
/// 日志初始化与工作器错误类型
pub mod utils;

/// 工作器模块
///
/// 实现后台作业执行和工作器管理
pub mod workers;
