// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 进度事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// 会话开始
    SessionStart,
    /// 单个用例开始
    CaseStart,
    /// 单个用例结果
    CaseResult,
    /// 报告生成结果
    ReportResult,
    /// 会话结束，唯一的终止事件
    SessionEnd,
}

impl EventKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, EventKind::SessionEnd)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventKind::SessionStart => write!(f, "SESSION_START"),
            EventKind::CaseStart => write!(f, "CASE_START"),
            EventKind::CaseResult => write!(f, "CASE_RESULT"),
            EventKind::ReportResult => write!(f, "REPORT_RESULT"),
            EventKind::SessionEnd => write!(f, "SESSION_END"),
        }
    }
}

/// 进度事件
///
/// 由执行工作器针对某个作业发布，订阅者各自收到一份拷贝
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// 单调递增的序号，从 1 开始
    pub sequence: u64,
    pub kind: EventKind,
    pub message: String,
    /// 0 表示进行中，1 表示终止
    pub status: i32,
    /// 用例、报告或会话整体是否通过
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

pub const STATUS_IN_PROGRESS: i32 = 0;
pub const STATUS_TERMINAL: i32 = 1;

impl ProgressEvent {
    /// 创建新的进度事件
    ///
    /// # 参数
    ///
    /// * `sequence` - 事件序号
    /// * `kind` - 事件类型
    /// * `message` - 事件描述
    /// * `passed` - 通过标记
    pub fn new(
        sequence: u64,
        kind: EventKind,
        message: impl Into<String>,
        passed: Option<bool>,
    ) -> Self {
        Self {
            sequence,
            kind,
            message: message.into(),
            status: if kind.is_terminal() {
                STATUS_TERMINAL
            } else {
                STATUS_IN_PROGRESS
            },
            passed,
            timestamp: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_session_end_is_terminal() {
        let end = ProgressEvent::new(4, EventKind::SessionEnd, "done", Some(true));
        assert_eq!(end.status, STATUS_TERMINAL);
        assert!(end.is_terminal());

        for kind in [
            EventKind::SessionStart,
            EventKind::CaseStart,
            EventKind::CaseResult,
            EventKind::ReportResult,
        ] {
            let event = ProgressEvent::new(1, kind, "x", None);
            assert_eq!(event.status, STATUS_IN_PROGRESS);
        }
    }

    #[test]
    fn test_event_json_shape() {
        let event = ProgressEvent::new(2, EventKind::CaseStart, "login", None);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], "CASE_START");
        assert!(value.get("passed").is_none());
    }
}
