// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// Redis 模块
///
/// 提供 Redis 客户端，以及基于它的事件通道与快照交接存储
pub mod redis_channel;
pub mod redis_client;
pub mod redis_handoff;
