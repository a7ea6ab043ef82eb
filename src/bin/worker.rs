// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::bail;
use apitestrs::bootstrap::Components;
use apitestrs::config::settings::Settings;
use apitestrs::infrastructure::metrics;
use apitestrs::utils::telemetry;
use apitestrs::workers::manager::shutdown_signal;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// 独立执行工作器入口点
///
/// 与 API 服务共享数据库和 Redis，从作业队列取出作业执行
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();
    info!("Starting apitestrs worker...");

    let settings = Settings::new()?;
    if settings.redis.is_in_memory() {
        bail!("Standalone worker requires a Redis broker; set redis.url or run workers embedded");
    }
    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics.listen_addr);
    }

    let components = Components::build(settings).await?;
    let settings = components.settings.clone();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut manager = components.worker_manager(shutdown_rx.clone())?;
    manager.start_workers(settings.worker.concurrency);
    manager.track(components.scheduler().start(shutdown_rx));
    info!("Worker process running {} tasks", manager.worker_count());

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);
    manager
        .join(Duration::from_secs(settings.worker.shutdown_grace_secs))
        .await;

    info!("apitestrs worker stopped");
    Ok(())
}
