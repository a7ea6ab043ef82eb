// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use apitestrs::bootstrap::Components;
use apitestrs::config::settings::{DatabaseSettings, Settings};
use apitestrs::domain::services::report_builder::{ReportBuilder, ReportError, ReportOutput};
use apitestrs::infrastructure::database::connection;
use apitestrs::infrastructure::database::entities::{
    environment as environment_entity, test_case as case_entity, test_suite as suite_entity,
};
use apitestrs::streaming::memory::InMemoryEventChannel;
use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

/// 迁移后的进程内 SQLite 数据库
pub async fn test_db() -> DatabaseConnection {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: None,
        min_connections: None,
        connect_timeout: None,
        idle_timeout: None,
    };
    connection::connect_and_migrate(&settings)
        .await
        .expect("Failed to prepare sqlite database")
}

/// 使用进程内代理与临时产物目录的配置
pub fn test_settings(artifact_dir: &Path) -> Settings {
    let mut settings = Settings::new().expect("Failed to load default settings");
    settings.redis.url = "memory://".to_string();
    settings.storage.artifact_path = artifact_dir.to_string_lossy().into_owned();
    settings.metrics.enabled = false;
    settings.worker.poll_interval_ms = 20;
    settings.worker.concurrency = 1;
    settings.execution.request_timeout_secs = 5;
    settings
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

pub async fn insert_case(
    db: &DatabaseConnection,
    id: i64,
    method: &str,
    path: &str,
    param_type: &str,
    param: Value,
    expected_status_code: i32,
) {
    let model = case_entity::ActiveModel {
        id: Set(id),
        title: Set(format!("case {}", id)),
        description: Set(String::new()),
        module: Set("smoke".to_string()),
        editor: Set("qa".to_string()),
        request_method: Set(method.to_string()),
        request_path: Set(path.to_string()),
        request_param_type: Set(param_type.to_string()),
        request_param: Set(param),
        expected_status_code: Set(expected_status_code),
        created_at: Set(now()),
        updated_at: Set(now()),
    };
    case_entity::Entity::insert(model)
        .exec(db)
        .await
        .expect("Failed to insert case");
}

/// 插入一个 `GET {path}` 用例，期望状态码为 `expected`
pub async fn insert_get_case(db: &DatabaseConnection, id: i64, path: &str, expected: i32) {
    insert_case(db, id, "GET", path, "none", json!({}), expected).await;
}

pub async fn insert_suite(db: &DatabaseConnection, id: i64, case_ids: &[i64]) {
    let model = suite_entity::ActiveModel {
        id: Set(id),
        name: Set(format!("suite {}", id)),
        description: Set(String::new()),
        case_ids: Set(json!(case_ids)),
        execution_state: Set(0),
        created_at: Set(now()),
        updated_at: Set(now()),
    };
    suite_entity::Entity::insert(model)
        .exec(db)
        .await
        .expect("Failed to insert suite");
}

pub async fn insert_environment(db: &DatabaseConnection, base_url: &str, headers: Value) {
    let model = environment_entity::ActiveModel {
        id: Set(1),
        name: Set("staging".to_string()),
        base_url: Set(base_url.to_string()),
        headers: Set(headers),
        is_current: Set(true),
        created_at: Set(now()),
    };
    environment_entity::Entity::insert(model)
        .exec(db)
        .await
        .expect("Failed to insert environment");
}

/// 在目标目录写入 `index.html`，不依赖外部报告工具
pub struct StubReport;

#[async_trait]
impl ReportBuilder for StubReport {
    async fn build(&self, raw_dir: &Path, dest_dir: &Path) -> Result<ReportOutput, ReportError> {
        let artifacts = std::fs::read_dir(raw_dir)?.count();
        std::fs::create_dir_all(dest_dir)?;
        std::fs::write(
            dest_dir.join("index.html"),
            format!("<p>{} results</p>", artifacts),
        )?;
        Ok(ReportOutput {
            dest_dir: dest_dir.to_path_buf(),
            duration_ms: 0,
        })
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub components: Components,
    /// 与路由共享的事件通道，可用于观察订阅情况
    pub channel: Arc<InMemoryEventChannel>,
    pub shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
    pub storage_dir: TempDir,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}

/// 创建测试应用，`configure` 可在组件装配前调整配置
pub async fn create_test_app_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    let storage_dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = test_settings(storage_dir.path());
    configure(&mut settings);

    let channel = Arc::new(InMemoryEventChannel::new(settings.stream.channel_capacity));
    let mut components = Components::from_connection(settings, test_db().await)
        .expect("Failed to assemble components")
        .with_reports(Arc::new(StubReport));
    components.channel = channel.clone();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = TestServer::new(components.router(shutdown_rx.clone()))
        .expect("Failed to start test server");

    TestApp {
        server,
        components,
        channel,
        shutdown_tx,
        shutdown_rx,
        storage_dir,
    }
}

/// 等待事件通道上出现订阅者
pub async fn wait_for_subscriber(channel: &InMemoryEventChannel) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while channel.topic_count() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("No subscriber appeared");
}
