// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// HTTP 响应体与领域模型之间的转换
pub mod job_response;
pub mod run_suite_response;
pub mod suite_response;
