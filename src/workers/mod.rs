// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 执行工作器与工作器生命周期管理
pub mod execution_worker;
pub mod manager;
pub mod worker;

pub use worker::Worker;
