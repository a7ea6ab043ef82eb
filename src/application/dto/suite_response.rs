// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::binding::SuiteJobBinding;
use crate::domain::models::suite::{ExecutionState, Suite};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 套件作业绑定响应
#[derive(Debug, Deserialize, Serialize)]
pub struct BindingResponseDto {
    pub suite_id: i64,
    /// 最近一次提交的作业ID
    pub job_id: Uuid,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<SuiteJobBinding> for BindingResponseDto {
    fn from(binding: SuiteJobBinding) -> Self {
        Self {
            suite_id: binding.suite_id,
            job_id: binding.job_id,
            updated_at: binding.updated_at,
        }
    }
}

/// 套件执行状态响应
#[derive(Debug, Deserialize, Serialize)]
pub struct SuiteStateResponseDto {
    pub suite_id: i64,
    /// 持久化的整数状态：0 未执行，1 成功，2 失败
    pub state: i32,
    pub state_name: String,
}

impl From<&Suite> for SuiteStateResponseDto {
    fn from(suite: &Suite) -> Self {
        Self::new(suite.id, suite.execution_state)
    }
}

impl SuiteStateResponseDto {
    pub fn new(suite_id: i64, state: ExecutionState) -> Self {
        Self {
            suite_id,
            state: state.as_i32(),
            state_name: state.to_string(),
        }
    }
}
