// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册流水线使用的各类指标。
/// 地址无法解析或端口被占用时只记录警告，进程继续运行。
///
/// # 参数
///
/// * `listen_addr` - 导出器监听地址
pub fn init_metrics(listen_addr: &str) {
    let addr: SocketAddr = match listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", listen_addr, e);
            return;
        }
    };

    // Port may already be taken when API and worker share a host
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!("jobs_submitted_total", "Suite runs accepted for execution");
    describe_counter!(
        "jobs_submit_failed_total",
        "Suite runs rejected during submission"
    );
    describe_counter!("jobs_requeued_total", "Stuck jobs returned to the queue");
    describe_counter!(
        "jobs_exhausted_total",
        "Stuck jobs failed after their last attempt"
    );
    describe_counter!(
        "cases_executed_total",
        "Test cases executed by workers, labelled by outcome"
    );
    describe_histogram!("job_duration_seconds", "Wall time of a whole suite run");
    describe_counter!(
        "report_builds_total",
        "Report builds attempted, labelled by outcome"
    );
    describe_counter!(
        "suite_finalize_total",
        "Suite execution states written from an exit code"
    );
    describe_counter!(
        "suite_finalize_unmapped_total",
        "Exit codes that do not map to a suite execution state"
    );
    describe_gauge!(
        "stream_subscribers_active",
        "Callers currently attached to a job event stream"
    );
}
