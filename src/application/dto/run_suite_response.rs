// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::submit_suite::SubmittedJob;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 套件运行响应数据传输对象
#[derive(Debug, Deserialize, Serialize)]
pub struct RunSuiteResponseDto {
    /// 请求处理是否成功
    pub success: bool,
    /// 作业ID，也是事件流的订阅标识
    pub job_id: Uuid,
    pub suite_id: i64,
    /// 快照中的用例数量
    pub case_count: usize,
}

impl From<SubmittedJob> for RunSuiteResponseDto {
    fn from(job: SubmittedJob) -> Self {
        Self {
            success: true,
            job_id: job.job_id,
            suite_id: job.suite_id,
            case_count: job.case_count,
        }
    }
}
