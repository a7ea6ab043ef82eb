// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::suite::ExecutionState;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 作业实体
///
/// 一次套件执行尝试。作业ID在提交时生成，同时用作事件通道的名称。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// 作业唯一标识符
    pub id: Uuid,
    /// 所属套件ID
    pub suite_id: i64,
    /// 作业状态
    pub status: JobStatus,
    /// 快照中的用例数量
    pub case_count: i32,
    /// 已投递次数
    pub attempt_count: i32,
    /// 最大投递次数
    pub max_attempts: i32,
    /// 工作器返回的退出码
    pub exit_code: Option<i32>,
    /// 提交时间
    pub submitted_at: DateTime<FixedOffset>,
    /// 开始执行时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 完成时间
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
    /// 持有锁的工作器
    pub lock_token: Option<Uuid>,
    /// 锁过期时间，过期后作业会被重新投递
    pub lock_expires_at: Option<DateTime<FixedOffset>>,
}

/// 作业状态枚举
///
/// Queued → Active → Completed/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已入队
    #[default]
    Queued,
    /// 执行中
    Active,
    /// 已完成，退出码已映射为套件状态
    Completed,
    /// 已失败
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Active => write!(f, "active"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "active" => Ok(JobStatus::Active),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 队列消息
///
/// 只携带标识信息，用例本身通过交接存储传递
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub job_id: Uuid,
    pub suite_id: i64,
    pub case_count: i32,
}

impl Job {
    /// 根据队列消息创建新的作业
    ///
    /// # 参数
    ///
    /// * `message` - 队列消息
    /// * `max_attempts` - 最大投递次数
    ///
    /// # 返回值
    ///
    /// 返回处于 Queued 状态的作业
    pub fn new(message: JobMessage, max_attempts: i32) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: message.job_id,
            suite_id: message.suite_id,
            status: JobStatus::Queued,
            case_count: message.case_count,
            attempt_count: 0,
            max_attempts: max_attempts.max(1),
            exit_code: None,
            submitted_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
            lock_token: None,
            lock_expires_at: None,
        }
    }

    /// 作业是否仍在排队或执行中
    pub fn is_in_flight(&self) -> bool {
        matches!(self.status, JobStatus::Queued | JobStatus::Active)
    }

    pub fn message(&self) -> JobMessage {
        JobMessage {
            job_id: self.id,
            suite_id: self.suite_id,
            case_count: self.case_count,
        }
    }
}

/// 运行器退出码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitCode {
    /// 所有断言通过
    AllPassed,
    /// 至少一个断言失败
    AssertionsFailed,
    /// 运行被外部中断
    Interrupted,
    /// 运行器内部错误
    InternalError,
    /// 运行器调用方式错误
    UsageError,
    /// 没有收集到用例
    NoCasesCollected,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::AllPassed => 0,
            ExitCode::AssertionsFailed => 1,
            ExitCode::Interrupted => 2,
            ExitCode::InternalError => 3,
            ExitCode::UsageError => 4,
            ExitCode::NoCasesCollected => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExitCode::AllPassed),
            1 => Some(ExitCode::AssertionsFailed),
            2 => Some(ExitCode::Interrupted),
            3 => Some(ExitCode::InternalError),
            4 => Some(ExitCode::UsageError),
            5 => Some(ExitCode::NoCasesCollected),
            _ => None,
        }
    }

    /// 映射到套件执行状态
    ///
    /// 只有 0 与 1 有对应状态，其余退出码返回 `None`
    pub fn suite_state(self) -> Option<ExecutionState> {
        match self {
            ExitCode::AllPassed => Some(ExecutionState::Succeeded),
            ExitCode::AssertionsFailed => Some(ExecutionState::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            ExitCode::AllPassed => "all assertions passed",
            ExitCode::AssertionsFailed => "assertions failed",
            ExitCode::Interrupted => "interrupted",
            ExitCode::InternalError => "internal error",
            ExitCode::UsageError => "usage error",
            ExitCode::NoCasesCollected => "no cases collected",
        };
        write!(f, "{} ({})", self.code(), label)
    }
}

/// 执行结果
///
/// 工作器交给结果终结器的载荷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub job_id: Uuid,
    pub suite_id: i64,
    pub exit_code: ExitCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_round_trip_and_mapping() {
        for code in 0..=5 {
            let exit = ExitCode::from_code(code).unwrap();
            assert_eq!(exit.code(), code);
        }
        assert_eq!(ExitCode::from_code(6), None);
        assert_eq!(
            ExitCode::AllPassed.suite_state(),
            Some(ExecutionState::Succeeded)
        );
        assert_eq!(
            ExitCode::AssertionsFailed.suite_state(),
            Some(ExecutionState::Failed)
        );
        for unmapped in [
            ExitCode::Interrupted,
            ExitCode::InternalError,
            ExitCode::UsageError,
            ExitCode::NoCasesCollected,
        ] {
            assert_eq!(unmapped.suite_state(), None);
        }
    }

    #[test]
    fn test_new_job_is_queued() {
        let message = JobMessage {
            job_id: Uuid::new_v4(),
            suite_id: 9,
            case_count: 3,
        };
        let job = Job::new(message, 0);
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.max_attempts, 1);
        assert!(job.is_in_flight());
        assert_eq!(job.message(), message);
    }
}
