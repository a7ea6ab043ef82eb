// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 非法的键
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// 产物存储特质
///
/// 以相对键保存作业的原始执行产物
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// 使用指定键保存数据
    async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// 根据键读取数据
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// 检查键是否存在
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// 键在本地文件系统上的位置，非文件系统实现返回 `None`
    fn resolve(&self, key: &str) -> Option<PathBuf>;
}
