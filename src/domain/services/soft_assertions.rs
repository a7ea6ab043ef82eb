// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::case::CaseRecord;
use crate::domain::models::job::ExitCode;

/// 单个失败的断言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub case_id: i64,
    pub title: String,
    pub expected: u16,
    /// 未收到响应时为 `None`
    pub observed: Option<u16>,
}

/// 软断言收集器
///
/// 断言失败只被记录，不中断后续用例的执行
#[derive(Debug, Default)]
pub struct SoftAssertions {
    checked: usize,
    failures: Vec<AssertionFailure>,
}

impl SoftAssertions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 断言实际状态码等于用例的期望状态码
    ///
    /// # 参数
    ///
    /// * `case` - 用例
    /// * `observed` - 实际状态码，请求未完成时为 `None`
    ///
    /// # 返回值
    ///
    /// 断言是否通过
    pub fn check_status(&mut self, case: &CaseRecord, observed: Option<u16>) -> bool {
        self.checked += 1;
        let passed = observed == Some(case.expected_status_code);
        if !passed {
            self.failures.push(AssertionFailure {
                case_id: case.id,
                title: case.title.clone(),
                expected: case.expected_status_code,
                observed,
            });
        }
        passed
    }

    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    /// 根据已记录的断言得出退出码
    pub fn exit_code(&self) -> ExitCode {
        if self.checked == 0 {
            ExitCode::NoCasesCollected
        } else if self.failures.is_empty() {
            ExitCode::AllPassed
        } else {
            ExitCode::AssertionsFailed
        }
    }
}
