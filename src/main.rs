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

use apitestrs::bootstrap::Components;
use apitestrs::config::settings::Settings;
use apitestrs::infrastructure::metrics;
use apitestrs::utils::telemetry;
use apitestrs::workers::manager::{shutdown_signal, WorkerManager};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

/// 主函数
///
/// API 服务入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting apitestrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics.listen_addr);
    }

    // 3. Database, broker and repositories
    let components = Components::build(settings).await?;
    let settings = components.settings.clone();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // 4. Embedded workers
    let workers: Option<WorkerManager> = if settings.worker.embedded {
        let mut manager = components.worker_manager(shutdown_rx.clone())?;
        manager.start_workers(settings.worker.concurrency);
        manager.track(components.scheduler().start(shutdown_rx.clone()));
        Some(manager)
    } else {
        if settings.redis.is_in_memory() {
            warn!("In-process broker without embedded workers; submitted jobs will not run here");
        }
        None
    };

    // 5. Start HTTP server
    let app = components.router(shutdown_rx);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    let signal_tx = shutdown_tx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(true);
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(manager) = workers {
        manager
            .join(Duration::from_secs(settings.worker.shutdown_grace_secs))
            .await;
    }

    info!("apitestrs stopped");
    Ok(())
}
