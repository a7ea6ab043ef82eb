// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::submit_suite::SubmitSuiteUseCase;
use crate::config::settings::Settings;
use crate::domain::repositories::binding_repository::BindingRepository;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::storage_repository::StorageRepository;
use crate::domain::repositories::suite_repository::SuiteRepository;
use crate::domain::services::artifact_writer::ArtifactWriter;
use crate::domain::services::execution_service::ExecutionService;
use crate::domain::services::report_builder::ReportBuilder;
use crate::domain::services::result_finalizer::ResultFinalizer;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::infrastructure::cache::redis_channel::RedisEventChannel;
use crate::infrastructure::cache::redis_client::RedisClient;
use crate::infrastructure::cache::redis_handoff::RedisHandoffStore;
use crate::infrastructure::database::connection::connect_and_migrate;
use crate::infrastructure::report_builder::CommandReportBuilder;
use crate::infrastructure::repositories::binding_repo_impl::BindingRepositoryImpl;
use crate::infrastructure::repositories::catalog_repo_impl::CatalogRepositoryImpl;
use crate::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use crate::infrastructure::storage::LocalStorage;
use crate::presentation::routes;
use crate::queue::handoff::{HandoffStore, InMemoryHandoffStore};
use crate::queue::job_queue::{JobQueue, PostgresJobQueue};
use crate::queue::scheduler::JobScheduler;
use crate::streaming::channel::EventChannel;
use crate::streaming::gateway::StreamGateway;
use crate::streaming::memory::InMemoryEventChannel;
use crate::workers::manager::WorkerManager;
use anyhow::{Context, Result};
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// 进程组件
///
/// API 服务与独立工作器共用的装配逻辑，所有客户端在这里显式创建并注入
#[derive(Clone)]
pub struct Components {
    pub settings: Settings,
    pub db: Arc<DatabaseConnection>,
    pub jobs: Arc<JobRepositoryImpl>,
    pub catalog: Arc<CatalogRepositoryImpl>,
    pub bindings: Arc<BindingRepositoryImpl>,
    pub queue: Arc<dyn JobQueue>,
    pub handoff: Arc<dyn HandoffStore>,
    pub channel: Arc<dyn EventChannel>,
    pub storage: Arc<dyn StorageRepository>,
    pub reports: Arc<dyn ReportBuilder>,
}

impl Components {
    /// 连接数据库、应用迁移并创建全部组件
    pub async fn build(settings: Settings) -> Result<Self> {
        let db = connect_and_migrate(&settings.database)
            .await
            .context("Failed to connect to database")?;
        info!("Database connected");
        Self::from_connection(settings, db)
    }

    /// 基于已迁移的数据库连接创建组件
    pub fn from_connection(settings: Settings, db: DatabaseConnection) -> Result<Self> {
        let db = Arc::new(db);
        let jobs = Arc::new(JobRepositoryImpl::new(
            db.clone(),
            settings.worker.lock_duration(),
        ));
        let catalog = Arc::new(CatalogRepositoryImpl::new(db.clone()));
        let bindings = Arc::new(BindingRepositoryImpl::new(db.clone()));
        let queue: Arc<dyn JobQueue> = Arc::new(PostgresJobQueue::new(
            jobs.clone(),
            settings.worker.max_attempts,
        ));

        let (handoff, channel) = Self::broker(&settings)?;
        let storage: Arc<dyn StorageRepository> =
            Arc::new(LocalStorage::new(&settings.storage.artifact_path));
        let reports: Arc<dyn ReportBuilder> =
            Arc::new(CommandReportBuilder::from_settings(&settings.report));

        Ok(Self {
            settings,
            db,
            jobs,
            catalog,
            bindings,
            queue,
            handoff,
            channel,
            storage,
            reports,
        })
    }

    fn broker(settings: &Settings) -> Result<(Arc<dyn HandoffStore>, Arc<dyn EventChannel>)> {
        if settings.redis.is_in_memory() {
            warn!("Using in-process event channel and handoff store; run workers embedded");
            let ttl = Duration::from_secs(settings.handoff.ttl_seconds);
            let handoff = InMemoryHandoffStore::new(ttl);
            let channel = InMemoryEventChannel::new(settings.stream.channel_capacity);
            return Ok((Arc::new(handoff), Arc::new(channel)));
        }

        let client = RedisClient::new(&settings.redis.url).context("Invalid Redis URL")?;
        let prefix = settings.redis.key_prefix.clone();
        let handoff =
            RedisHandoffStore::new(client.clone(), prefix.clone(), settings.handoff.ttl_seconds);
        let channel = RedisEventChannel::new(client, prefix);
        Ok((Arc::new(handoff), Arc::new(channel)))
    }

    /// 使用其他报告生成器替换默认实现
    pub fn with_reports(mut self, reports: Arc<dyn ReportBuilder>) -> Self {
        self.reports = reports;
        self
    }

    pub fn submit_use_case(&self) -> SubmitSuiteUseCase {
        SubmitSuiteUseCase::new(
            self.catalog.clone(),
            self.catalog.clone(),
            self.jobs.clone(),
            self.bindings.clone(),
            self.handoff.clone(),
            self.queue.clone(),
            self.settings.execution.single_flight_per_suite,
        )
    }

    pub fn execution_service(&self) -> Result<ExecutionService> {
        let timeout = Duration::from_secs(self.settings.execution.request_timeout_secs.max(1));
        let engine = ReqwestEngine::new(timeout).context("Failed to build HTTP client")?;
        Ok(ExecutionService::new(
            self.handoff.clone(),
            self.catalog.clone(),
            Arc::new(engine),
            self.channel.clone(),
            ArtifactWriter::new(self.storage.clone()),
            self.reports.clone(),
        ))
    }

    pub fn finalizer(&self) -> ResultFinalizer {
        ResultFinalizer::new(self.catalog.clone())
    }

    pub fn scheduler(&self) -> JobScheduler<JobRepositoryImpl> {
        JobScheduler::new(
            self.jobs.clone(),
            Duration::from_secs(self.settings.worker.maintenance_interval_secs.max(1)),
        )
    }

    /// 创建工作管理器，尚未启动任何工作器
    pub fn worker_manager(&self, shutdown: watch::Receiver<bool>) -> Result<WorkerManager> {
        Ok(WorkerManager::new(
            self.queue.clone(),
            Arc::new(self.execution_service()?),
            Arc::new(self.finalizer()),
            self.settings.worker.poll_interval(),
            self.settings.worker.heartbeat_interval(),
            shutdown,
        ))
    }

    /// 创建 HTTP 路由
    pub fn router(&self, shutdown: watch::Receiver<bool>) -> Router {
        let gateway = Arc::new(StreamGateway::new(
            self.channel.clone(),
            self.settings.stream.buffer_size,
        ));
        let jobs: Arc<dyn JobRepository> = self.jobs.clone();
        let suites: Arc<dyn SuiteRepository> = self.catalog.clone();
        let bindings: Arc<dyn BindingRepository> = self.bindings.clone();

        routes::app(routes::ApiState {
            submit: Arc::new(self.submit_use_case()),
            jobs,
            suites,
            bindings,
            gateway,
            stream: self.settings.stream.clone(),
            shutdown,
        })
    }
}
