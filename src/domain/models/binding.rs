// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 套件与作业的绑定
///
/// 每个套件只保留最近一次提交的作业，重复提交时覆盖
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteJobBinding {
    pub suite_id: i64,
    pub job_id: Uuid,
    pub updated_at: DateTime<FixedOffset>,
}
