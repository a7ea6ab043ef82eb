// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 实时进度模块
///
/// 按作业划分的事件通道、带序号的事件发布器与面向调用方的事件网关
pub mod channel;
pub mod emitter;
pub mod gateway;
pub mod memory;
