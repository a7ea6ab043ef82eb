// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::case::CaseSnapshot;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// 交接存储错误类型
#[derive(Error, Debug)]
pub enum HandoffError {
    /// 存储后端不可用
    #[error("Handoff store unavailable: {0}")]
    Unavailable(String),
    /// 存储的快照无法解析
    #[error("Handoff payload corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// 用例快照交接存储
///
/// 提交方按作业ID写入快照，工作器在收集阶段显式取回
#[async_trait]
pub trait HandoffStore: Send + Sync {
    /// 写入作业的用例快照
    async fn put(&self, job_id: Uuid, snapshot: &CaseSnapshot) -> Result<(), HandoffError>;

    /// 取回作业的用例快照，不存在或已过期时返回 `None`
    async fn fetch(&self, job_id: Uuid) -> Result<Option<CaseSnapshot>, HandoffError>;

    /// 删除作业的用例快照
    async fn discard(&self, job_id: Uuid) -> Result<(), HandoffError>;
}

/// 进程内交接存储
///
/// 每次写入时顺带清理已过期的条目
pub struct InMemoryHandoffStore {
    entries: DashMap<Uuid, (CaseSnapshot, Instant)>,
    ttl: Duration,
}

impl InMemoryHandoffStore {
    /// 创建新的进程内交接存储
    ///
    /// # 参数
    ///
    /// * `ttl` - 快照存活时长
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// 当前保存的条目数量，包含尚未清理的过期条目
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl HandoffStore for InMemoryHandoffStore {
    async fn put(&self, job_id: Uuid, snapshot: &CaseSnapshot) -> Result<(), HandoffError> {
        let now = Instant::now();
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);
        self.entries.insert(job_id, (snapshot.clone(), now + self.ttl));
        Ok(())
    }

    async fn fetch(&self, job_id: Uuid) -> Result<Option<CaseSnapshot>, HandoffError> {
        let expired = match self.entries.get(&job_id) {
            Some(entry) if entry.1 > Instant::now() => return Ok(Some(entry.0.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(&job_id);
        }
        Ok(None)
    }

    async fn discard(&self, job_id: Uuid) -> Result<(), HandoffError> {
        self.entries.remove(&job_id);
        Ok(())
    }
}
