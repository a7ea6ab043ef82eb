// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::ExitCode;
use crate::domain::models::suite::ExecutionState;
use crate::domain::repositories::suite_repository::SuiteRepository;
use crate::domain::repositories::RepositoryError;
use metrics::counter;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// 结果终结错误类型
#[derive(Error, Debug)]
pub enum FinalizeError {
    /// 退出码没有对应的套件状态，套件状态保持不变
    #[error("Exit code {code} of suite {suite_id} has no execution state mapping")]
    UnmappedExitCode { code: i32, suite_id: i64 },
    /// 写入套件状态失败
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 结果终结器
///
/// 把运行器退出码映射为套件执行状态并写回一次。
/// 只映射 0 与 1，其他退出码返回错误而不是被强制转换。
pub struct ResultFinalizer {
    suites: Arc<dyn SuiteRepository>,
}

impl ResultFinalizer {
    /// 创建新的结果终结器
    ///
    /// # 参数
    ///
    /// * `suites` - 套件仓库
    pub fn new(suites: Arc<dyn SuiteRepository>) -> Self {
        Self { suites }
    }

    /// 终结一次执行
    ///
    /// # 参数
    ///
    /// * `exit_code` - 运行器退出码
    /// * `suite_id` - 套件ID
    ///
    /// # 返回值
    ///
    /// * `Ok(ExecutionState)` - 已写入的套件状态
    /// * `Err(FinalizeError)` - 退出码未映射或写入失败
    pub async fn finalize(
        &self,
        exit_code: i32,
        suite_id: i64,
    ) -> Result<ExecutionState, FinalizeError> {
        let Some(state) = ExitCode::from_code(exit_code).and_then(ExitCode::suite_state) else {
            error!(
                suite_id,
                exit_code, "Exit code has no suite state mapping, suite state left unchanged"
            );
            counter!("suite_finalize_unmapped_total", "exit_code" => exit_code.to_string())
                .increment(1);
            return Err(FinalizeError::UnmappedExitCode {
                code: exit_code,
                suite_id,
            });
        };

        self.suites.update_execution_state(suite_id, state).await?;
        counter!("suite_finalize_total", "state" => state.to_string()).increment(1);
        info!(suite_id, exit_code, state = %state, "Suite execution state finalized");
        Ok(state)
    }
}
