// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// 单次维护的结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// 重新入队的作业数
    pub requeued: u64,
    /// 投递次数耗尽被标记失败的作业数
    pub exhausted: u64,
}

/// 作业维护调度器
///
/// 锁过期的作业在投递次数未耗尽时重新入队，实现至少一次投递；
/// 耗尽的作业标记为失败，不做终结。
pub struct JobScheduler<R: JobRepository + 'static> {
    /// 作业仓库
    repository: Arc<R>,
    /// 维护间隔
    period: Duration,
}

impl<R: JobRepository + 'static> JobScheduler<R> {
    /// 创建新的调度器实例
    ///
    /// # 参数
    ///
    /// * `repository` - 作业仓库
    /// * `period` - 维护间隔
    pub fn new(repository: Arc<R>, period: Duration) -> Self {
        Self { repository, period }
    }

    /// 执行一次维护
    pub async fn run_maintenance(&self) -> Result<MaintenanceReport, RepositoryError> {
        let requeued = self.repository.reset_stuck_jobs().await?;
        let exhausted = self.repository.fail_exhausted_jobs().await?;

        if requeued > 0 {
            info!("Requeued {} jobs with expired locks", requeued);
            counter!("jobs_requeued_total").increment(requeued);
        }
        if exhausted > 0 {
            warn!("Marked {} jobs failed after exhausting attempts", exhausted);
            counter!("jobs_exhausted_total").increment(exhausted);
        }

        Ok(MaintenanceReport {
            requeued,
            exhausted,
        })
    }

    /// 启动调度器后台任务
    ///
    /// # 参数
    ///
    /// * `shutdown` - 关闭信号，值变为 `true` 时退出
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Job scheduler stopping");
                            return;
                        }
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_maintenance().await {
                            error!("Job maintenance failed: {}", e);
                        }
                        debug!("Scheduler maintenance tick");
                    }
                }
            }
        })
    }
}
