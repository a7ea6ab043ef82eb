// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ReportSettings;
use crate::domain::services::report_builder::{ReportBuilder, ReportError, ReportOutput};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info};

/// stderr kept in the error message
const MAX_STDERR_CHARS: usize = 2000;

/// 外部进程报告生成器
///
/// 参数中的 `{raw}` 与 `{dest}` 分别替换为原始产物目录与报告目录。
/// 超时后子进程随 future 一起被终止。
pub struct CommandReportBuilder {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandReportBuilder {
    /// 创建新的报告生成器
    ///
    /// # 参数
    ///
    /// * `program` - 可执行程序
    /// * `args` - 参数模板
    /// * `timeout` - 生成超时
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_settings(settings: &ReportSettings) -> Self {
        Self::new(
            settings.command.clone(),
            settings.args.clone(),
            Duration::from_secs(settings.timeout_secs.max(1)),
        )
    }

    fn render_args(&self, raw_dir: &Path, dest_dir: &Path) -> Vec<String> {
        let raw = raw_dir.to_string_lossy();
        let dest = dest_dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{raw}", &raw).replace("{dest}", &dest))
            .collect()
    }
}

fn tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.trim().to_string();
    }
    text.chars().skip(count - max_chars).collect::<String>().trim().to_string()
}

#[async_trait]
impl ReportBuilder for CommandReportBuilder {
    async fn build(&self, raw_dir: &Path, dest_dir: &Path) -> Result<ReportOutput, ReportError> {
        tokio::fs::create_dir_all(dest_dir).await?;

        let args = self.render_args(raw_dir, dest_dir);
        debug!(program = %self.program, ?args, "Launching report generator");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ReportError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(ReportError::Failed {
                status: output.status.to_string(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), MAX_STDERR_CHARS),
            });
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(dest = %dest_dir.display(), duration_ms, "Report generator finished");
        Ok(ReportOutput {
            dest_dir: dest_dir.to_path_buf(),
            duration_ms,
        })
    }
}
