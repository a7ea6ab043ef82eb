// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::case::CaseSnapshot;
use crate::domain::models::environment::TargetEnvironment;
use crate::domain::models::event::EventKind;
use crate::domain::models::job::{ExecutionOutcome, ExitCode};
use crate::domain::repositories::environment_repository::EnvironmentRepository;
use crate::domain::services::artifact_writer::{ArtifactWriter, CaseArtifact};
use crate::domain::services::report_builder::{ReportBuilder, ReportError};
use crate::domain::services::soft_assertions::SoftAssertions;
use crate::engines::traits::CaseEngine;
use crate::queue::handoff::HandoffStore;
use crate::streaming::channel::EventChannel;
use crate::streaming::emitter::EventEmitter;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 用例执行服务
///
/// 工作器的核心：按作业ID取回用例快照，为每个用例生成一次调用，
/// 逐个执行并发布进度事件，写出原始产物，最后尝试生成报告。
///
/// 对每个作业保证：首个事件是 `SESSION_START`，最后一个事件是
/// 唯一的 `SESSION_END`，即使在收集阶段就失败也是如此。
pub struct ExecutionService {
    handoff: Arc<dyn HandoffStore>,
    environments: Arc<dyn EnvironmentRepository>,
    engine: Arc<dyn CaseEngine>,
    channel: Arc<dyn EventChannel>,
    artifacts: ArtifactWriter,
    reports: Arc<dyn ReportBuilder>,
}

impl ExecutionService {
    /// 创建新的执行服务
    ///
    /// # 参数
    ///
    /// * `handoff` - 快照交接存储
    /// * `environments` - 目标环境仓库
    /// * `engine` - 用例执行引擎
    /// * `channel` - 事件通道
    /// * `artifacts` - 产物写入器
    /// * `reports` - 报告生成器
    pub fn new(
        handoff: Arc<dyn HandoffStore>,
        environments: Arc<dyn EnvironmentRepository>,
        engine: Arc<dyn CaseEngine>,
        channel: Arc<dyn EventChannel>,
        artifacts: ArtifactWriter,
        reports: Arc<dyn ReportBuilder>,
    ) -> Self {
        Self {
            handoff,
            environments,
            engine,
            channel,
            artifacts,
            reports,
        }
    }

    /// 执行一个作业
    ///
    /// # 参数
    ///
    /// * `job_id` - 作业ID
    /// * `suite_id` - 套件ID
    /// * `shutdown` - 关闭信号，在每个用例开始前检查
    ///
    /// # 返回值
    ///
    /// 退出码与套件ID，交给结果终结器
    pub async fn execute(
        &self,
        job_id: Uuid,
        suite_id: i64,
        shutdown: &watch::Receiver<bool>,
    ) -> ExecutionOutcome {
        let started = Instant::now();
        let emitter = EventEmitter::new(self.channel.clone(), job_id);

        emitter
            .emit(
                EventKind::SessionStart,
                format!("job {} started for suite {}", job_id, suite_id),
                None,
            )
            .await;

        let exit_code = self.run(&emitter, job_id, shutdown).await;

        emitter
            .emit(
                EventKind::SessionEnd,
                format!("job {} finished: {}", job_id, exit_code),
                Some(exit_code == ExitCode::AllPassed),
            )
            .await;

        // snapshots of runs that did not complete expire with the handoff TTL
        if exit_code.suite_state().is_some() {
            if let Err(e) = self.handoff.discard(job_id).await {
                warn!(job_id = %job_id, "Failed to discard case snapshot: {}", e);
            }
        }

        histogram!("job_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            job_id = %job_id,
            suite_id,
            exit_code = exit_code.code(),
            events = emitter.emitted(),
            "Job execution finished"
        );

        ExecutionOutcome {
            job_id,
            suite_id,
            exit_code,
        }
    }

    async fn run(
        &self,
        emitter: &EventEmitter,
        job_id: Uuid,
        shutdown: &watch::Receiver<bool>,
    ) -> ExitCode {
        let snapshot = match self.collect(job_id).await {
            Ok(snapshot) => snapshot,
            Err(exit_code) => return exit_code,
        };
        let environment = match self.target_environment(job_id).await {
            Ok(environment) => environment,
            Err(exit_code) => return exit_code,
        };

        info!(
            job_id = %job_id,
            cases = snapshot.len(),
            environment = %environment.name,
            "Collected cases"
        );

        let mut assertions = SoftAssertions::new();
        let total = snapshot.len();

        for (index, case) in snapshot.iter().enumerate() {
            if *shutdown.borrow() {
                warn!(job_id = %job_id, executed = index, total, "Run interrupted by shutdown");
                return ExitCode::Interrupted;
            }

            emitter
                .emit(
                    EventKind::CaseStart,
                    format!(
                        "[{}/{}] case {} '{}': {} {}",
                        index + 1,
                        total,
                        case.id,
                        case.title,
                        case.request_method,
                        case.request_path
                    ),
                    None,
                )
                .await;

            let mut artifact = CaseArtifact::for_case(job_id, index, case, self.engine.name());
            match self.engine.execute(&environment, case).await {
                Ok(response) => {
                    artifact.url = Some(response.url);
                    artifact.observed_status_code = Some(response.status_code);
                    artifact.response_headers = response.headers;
                    artifact.elapsed_ms = response.elapsed_ms;
                }
                Err(e) => {
                    warn!(
                        job_id = %job_id,
                        case_id = case.id,
                        transport = e.is_transport(),
                        "Case request failed: {}",
                        e
                    );
                    artifact.transport_error = e.is_transport();
                    artifact.error = Some(e.to_string());
                }
            }

            let passed = assertions.check_status(case, artifact.observed_status_code);
            let outcome = if passed { "passed" } else { "failed" };
            artifact.passed = passed;
            counter!("cases_executed_total", "outcome" => outcome).increment(1);

            let observed = artifact
                .observed_status_code
                .map(|s| s.to_string())
                .unwrap_or_else(|| "no response".to_string());
            emitter
                .emit(
                    EventKind::CaseResult,
                    format!(
                        "[{}/{}] case {} '{}' {}: expected {}, observed {}",
                        index + 1,
                        total,
                        case.id,
                        case.title,
                        outcome,
                        case.expected_status_code,
                        observed
                    ),
                    Some(passed),
                )
                .await;

            if let Err(e) = self.artifacts.write(&artifact).await {
                warn!(job_id = %job_id, case_id = case.id, "Failed to write artifact: {}", e);
            }
        }

        let exit_code = assertions.exit_code();
        self.build_report(emitter, job_id).await;
        exit_code
    }

    async fn collect(&self, job_id: Uuid) -> Result<CaseSnapshot, ExitCode> {
        match self.handoff.fetch(job_id).await {
            Ok(Some(snapshot)) if !snapshot.is_empty() => Ok(snapshot),
            Ok(_) => {
                warn!(job_id = %job_id, "No case snapshot found for job");
                Err(ExitCode::NoCasesCollected)
            }
            Err(e) => {
                error!(job_id = %job_id, "Failed to fetch case snapshot: {}", e);
                Err(ExitCode::InternalError)
            }
        }
    }

    async fn target_environment(&self, job_id: Uuid) -> Result<TargetEnvironment, ExitCode> {
        let environment = match self.environments.find_current().await {
            Ok(Some(environment)) => environment,
            Ok(None) => {
                error!(job_id = %job_id, "No current target environment configured");
                return Err(ExitCode::UsageError);
            }
            Err(e) => {
                error!(job_id = %job_id, "Failed to load target environment: {}", e);
                return Err(ExitCode::InternalError);
            }
        };

        if let Err(e) = environment.ensure_valid() {
            error!(
                job_id = %job_id,
                environment = %environment.name,
                "Target environment is unusable: {}",
                e
            );
            return Err(ExitCode::UsageError);
        }
        Ok(environment)
    }

    /// 生成报告并发布结果事件，失败不影响退出码
    async fn build_report(&self, emitter: &EventEmitter, job_id: Uuid) {
        let result = match (
            self.artifacts.raw_dir(job_id),
            self.artifacts.report_dir(job_id),
        ) {
            (Some(raw_dir), Some(dest_dir)) => self.reports.build(&raw_dir, &dest_dir).await,
            _ => Err(ReportError::ArtifactsUnavailable),
        };

        match result {
            Ok(output) => {
                counter!("report_builds_total", "outcome" => "success").increment(1);
                info!(job_id = %job_id, duration_ms = output.duration_ms, "Report generated");
                emitter
                    .emit(
                        EventKind::ReportResult,
                        format!("report generated at {}", output.dest_dir.display()),
                        Some(true),
                    )
                    .await;
            }
            Err(e) => {
                counter!("report_builds_total", "outcome" => "failure").increment(1);
                warn!(job_id = %job_id, "Report generation failed: {}", e);
                emitter
                    .emit(
                        EventKind::ReportResult,
                        format!("report generation failed: {}", e),
                        Some(false),
                    )
                    .await;
            }
        }
    }
}

#[cfg(test)]
#[path = "execution_service_test.rs"]
mod tests;
