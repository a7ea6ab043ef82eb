// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::execution_service::ExecutionService;
use crate::domain::services::result_finalizer::ResultFinalizer;
use crate::queue::job_queue::JobQueue;
use crate::workers::execution_worker::ExecutionWorker;
use crate::workers::worker::Worker;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 工作管理器
///
/// 启动执行工作器并在关闭时等待它们结束当前作业
pub struct WorkerManager {
    queue: Arc<dyn JobQueue>,
    service: Arc<ExecutionService>,
    finalizer: Arc<ResultFinalizer>,
    poll_interval: Duration,
    heartbeat_interval: Duration,
    shutdown: watch::Receiver<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerManager {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        service: Arc<ExecutionService>,
        finalizer: Arc<ResultFinalizer>,
        poll_interval: Duration,
        heartbeat_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            queue,
            service,
            finalizer,
            poll_interval,
            heartbeat_interval,
            shutdown,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        for _ in 0..count.max(1) {
            let worker = ExecutionWorker::new(
                self.queue.clone(),
                self.service.clone(),
                self.finalizer.clone(),
                self.poll_interval,
                self.heartbeat_interval,
                self.shutdown.clone(),
            );

            let handle = tokio::spawn(async move {
                if let Err(e) = worker.run().await {
                    error!("Worker {} exited with error: {}", worker.name(), e);
                }
            });
            self.handles.push(handle);
        }
        info!("Started {} execution workers", self.handles.len());
    }

    /// 由管理器一并等待的其他后台任务
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.handles.push(handle);
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 等待所有任务结束
    ///
    /// 调用前应已发出关闭信号；超过宽限期仍未结束的任务会被中止
    ///
    /// # 参数
    ///
    /// * `grace` - 宽限期
    pub async fn join(self, grace: Duration) {
        info!("Shutting down workers...");
        let mut handles = self.handles;
        let drained = tokio::time::timeout(grace, async {
            for handle in handles.iter_mut() {
                let _ = handle.await;
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                "Workers did not stop within {}s, aborting",
                grace.as_secs()
            );
            for handle in &handles {
                handle.abort();
            }
        }
        info!("Workers shut down successfully");
    }
}

/// 等待 Ctrl-C
pub async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
