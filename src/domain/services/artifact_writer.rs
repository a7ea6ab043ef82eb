// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::case::CaseRecord;
use crate::domain::repositories::storage_repository::{StorageError, StorageRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// 单个用例的原始执行产物
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseArtifact {
    pub job_id: Uuid,
    /// 用例在快照中的位置，从 0 开始
    pub index: usize,
    pub case_id: i64,
    pub title: String,
    pub module: String,
    pub request_method: String,
    pub request_path: String,
    /// 执行该用例的引擎
    pub engine: String,
    pub url: Option<String>,
    pub expected_status_code: u16,
    pub observed_status_code: Option<u16>,
    pub response_headers: HashMap<String, String>,
    pub passed: bool,
    pub elapsed_ms: u64,
    pub error: Option<String>,
    /// 错误是否发生在网络传输层（超时、连接失败）
    pub transport_error: bool,
    pub recorded_at: DateTime<Utc>,
}

impl CaseArtifact {
    /// 从用例创建尚未填入结果的产物
    pub fn for_case(job_id: Uuid, index: usize, case: &CaseRecord, engine: &str) -> Self {
        Self {
            job_id,
            index,
            case_id: case.id,
            title: case.title.clone(),
            module: case.module.clone(),
            request_method: case.request_method.clone(),
            request_path: case.request_path.clone(),
            engine: engine.to_string(),
            url: None,
            expected_status_code: case.expected_status_code,
            observed_status_code: None,
            response_headers: HashMap::new(),
            passed: false,
            elapsed_ms: 0,
            error: None,
            transport_error: false,
            recorded_at: Utc::now(),
        }
    }
}

/// 产物写入器
///
/// 原始产物位于 `{job_id}/raw/`，报告位于 `{job_id}/report/`
#[derive(Clone)]
pub struct ArtifactWriter {
    storage: Arc<dyn StorageRepository>,
}

impl ArtifactWriter {
    pub fn new(storage: Arc<dyn StorageRepository>) -> Self {
        Self { storage }
    }

    pub fn raw_key(job_id: Uuid) -> String {
        format!("{}/raw", job_id)
    }

    pub fn report_key(job_id: Uuid) -> String {
        format!("{}/report", job_id)
    }

    /// 写入一个用例产物
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 产物的存储键
    /// * `Err(StorageError)` - 序列化或写入失败
    pub async fn write(&self, artifact: &CaseArtifact) -> Result<String, StorageError> {
        let key = format!(
            "{}/{:04}-case-{}-result.json",
            Self::raw_key(artifact.job_id),
            artifact.index,
            artifact.case_id
        );
        let payload = serde_json::to_vec_pretty(artifact)?;
        self.storage.save(&key, &payload).await?;
        Ok(key)
    }

    /// 原始产物目录在本地文件系统上的位置
    pub fn raw_dir(&self, job_id: Uuid) -> Option<PathBuf> {
        self.storage.resolve(&Self::raw_key(job_id))
    }

    /// 报告目录在本地文件系统上的位置
    pub fn report_dir(&self, job_id: Uuid) -> Option<PathBuf> {
        self.storage.resolve(&Self::report_key(job_id))
    }
}
