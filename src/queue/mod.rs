// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供作业队列、用例快照交接与维护调度
pub mod handoff;
pub mod job_queue;
pub mod scheduler;
