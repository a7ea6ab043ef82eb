// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 套件运行提交、作业查询与实时事件流
pub mod events_handler;
pub mod job_handler;
pub mod suite_handler;
