// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 报告生成错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    /// 无法启动报告进程
    #[error("Failed to launch report generator: {0}")]
    Launch(#[from] std::io::Error),
    /// 报告进程超时
    #[error("Report generator timed out after {0}s")]
    Timeout(u64),
    /// 报告进程以非零状态退出
    #[error("Report generator exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    /// 原始产物不在本地文件系统上
    #[error("Raw artifacts are not available on the local filesystem")]
    ArtifactsUnavailable,
}

/// 报告生成结果
#[derive(Debug, Clone)]
pub struct ReportOutput {
    /// 报告目录
    pub dest_dir: PathBuf,
    /// 生成耗时（毫秒）
    pub duration_ms: u64,
}

/// 报告生成器特质
///
/// 把工作器写出的原始产物目录转换为可浏览的报告
#[async_trait]
pub trait ReportBuilder: Send + Sync {
    async fn build(&self, raw_dir: &Path, dest_dir: &Path) -> Result<ReportOutput, ReportError>;
}
