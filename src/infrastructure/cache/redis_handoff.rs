// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::case::CaseSnapshot;
use crate::infrastructure::cache::redis_client::RedisClient;
use crate::queue::handoff::{HandoffError, HandoffStore};
use async_trait::async_trait;
use uuid::Uuid;

/// 基于 Redis 的快照交接存储
///
/// 快照以 JSON 数组保存，键带有过期时间
#[derive(Clone)]
pub struct RedisHandoffStore {
    client: RedisClient,
    prefix: String,
    ttl_seconds: u64,
}

impl RedisHandoffStore {
    /// 创建新的交接存储
    ///
    /// # 参数
    ///
    /// * `client` - Redis客户端
    /// * `prefix` - 键前缀
    /// * `ttl_seconds` - 快照过期时间（秒）
    pub fn new(client: RedisClient, prefix: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            client,
            prefix: prefix.into(),
            ttl_seconds: ttl_seconds.max(1),
        }
    }

    fn key(&self, job_id: Uuid) -> String {
        format!("{}:job:{}:cases", self.prefix, job_id)
    }
}

#[async_trait]
impl HandoffStore for RedisHandoffStore {
    async fn put(&self, job_id: Uuid, snapshot: &CaseSnapshot) -> Result<(), HandoffError> {
        let payload = serde_json::to_string(snapshot)?;
        self.client
            .set(&self.key(job_id), &payload, self.ttl_seconds)
            .await
            .map_err(|e| HandoffError::Unavailable(e.to_string()))
    }

    async fn fetch(&self, job_id: Uuid) -> Result<Option<CaseSnapshot>, HandoffError> {
        let payload = self
            .client
            .get(&self.key(job_id))
            .await
            .map_err(|e| HandoffError::Unavailable(e.to_string()))?;

        payload
            .map(|p| serde_json::from_str::<CaseSnapshot>(&p))
            .transpose()
            .map_err(HandoffError::from)
    }

    async fn discard(&self, job_id: Uuid) -> Result<(), HandoffError> {
        self.client
            .del(&self.key(job_id))
            .await
            .map_err(|e| HandoffError::Unavailable(e.to_string()))
    }
}
