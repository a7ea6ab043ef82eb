// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::result_finalizer::FinalizeError;
use crate::queue::job_queue::QueueError;
use thiserror::Error;

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("队列错误: {0}")]
    Queue(#[from] QueueError),

    #[error("结果终结错误: {0}")]
    Finalize(#[from] FinalizeError),

    #[error("内部错误: {0}")]
    InternalError(String),
}
