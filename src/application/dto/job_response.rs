// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{Job, JobStatus};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 作业记录响应
///
/// 锁信息属于队列内部状态，不对外暴露
#[derive(Debug, Deserialize, Serialize)]
pub struct JobResponseDto {
    pub id: Uuid,
    pub suite_id: i64,
    pub status: JobStatus,
    pub case_count: i32,
    pub attempt_count: i32,
    pub max_attempts: i32,
    pub exit_code: Option<i32>,
    pub submitted_at: DateTime<FixedOffset>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
}

impl From<Job> for JobResponseDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            suite_id: job.suite_id,
            status: job.status,
            case_count: job.case_count,
            attempt_count: job.attempt_count,
            max_attempts: job.max_attempts,
            exit_code: job.exit_code,
            submitted_at: job.submitted_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}
