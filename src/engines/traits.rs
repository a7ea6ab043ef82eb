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

use crate::domain::models::case::CaseRecord;
use crate::domain::models::environment::TargetEnvironment;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 无效的请求方法
    #[error("Invalid request method: {0}")]
    InvalidMethod(String),
    /// 无法拼接出有效的请求地址
    #[error("Invalid request url: {0}")]
    InvalidUrl(String),
    /// 请求参数与参数类型不匹配
    #[error("Invalid request parameter: {0}")]
    InvalidParam(String),
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否发生在网络传输层
    ///
    /// # 返回值
    ///
    /// 超时或连接失败返回true，用例自身定义错误返回false
    pub fn is_transport(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// 用例响应
#[derive(Debug, Clone)]
pub struct CaseResponse {
    /// 实际请求的地址
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub body: String,
    /// 响应头
    pub headers: HashMap<String, String>,
    /// 响应时间（毫秒）
    pub elapsed_ms: u64,
}

/// 用例执行引擎特质
#[async_trait]
pub trait CaseEngine: Send + Sync {
    /// 对目标环境发出用例描述的请求
    async fn execute(
        &self,
        environment: &TargetEnvironment,
        case: &CaseRecord,
    ) -> Result<CaseResponse, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
