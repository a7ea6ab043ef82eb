// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 套件执行状态
///
/// 仅由结果终结器修改
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    /// 未执行
    #[default]
    NotExecuted,
    /// 执行成功
    Succeeded,
    /// 执行失败
    Failed,
}

impl ExecutionState {
    /// 持久化使用的整数值
    pub fn as_i32(self) -> i32 {
        match self {
            ExecutionState::NotExecuted => 0,
            ExecutionState::Succeeded => 1,
            ExecutionState::Failed => 2,
        }
    }

    /// 从持久化的整数值解析，未知值返回 `None`
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(ExecutionState::NotExecuted),
            1 => Some(ExecutionState::Succeeded),
            2 => Some(ExecutionState::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionState::NotExecuted => write!(f, "NOT_EXECUTED"),
            ExecutionState::Succeeded => write!(f, "SUCCEEDED"),
            ExecutionState::Failed => write!(f, "FAILED"),
        }
    }
}

/// 测试套件
///
/// 一组有序的用例引用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// 用例ID，按执行顺序排列
    pub case_ids: Vec<i64>,
    pub execution_state: ExecutionState,
}
