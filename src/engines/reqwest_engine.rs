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

use crate::domain::models::case::{CaseRecord, ParamType};
use crate::domain::models::environment::TargetEnvironment;
use crate::engines::traits::{CaseEngine, CaseResponse, EngineError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::warn;
use url::Url;

/// 用例执行引擎
///
/// 基于reqwest实现，按用例的参数类型组装查询串、JSON 或表单请求体
pub struct ReqwestEngine {
    client: reqwest::Client,
}

impl ReqwestEngine {
    /// 创建新的执行引擎
    ///
    /// # 参数
    ///
    /// * `timeout` - 单个请求的超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 引擎实例
    /// * `Err(EngineError)` - HTTP客户端构建失败
    pub fn new(timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("apitestrs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

/// 拼接环境基础地址与用例路径
///
/// 用例路径本身是完整地址时直接使用
pub fn resolve_url(base_url: &str, path: &str) -> Result<Url, EngineError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path)
            .map_err(|e| EngineError::InvalidUrl(format!("{}: {}", path, e)));
    }
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| EngineError::InvalidUrl(format!("{}: {}", joined, e)))
}

/// 把对象参数展开为键值对
///
/// 字符串值原样使用，其他值使用其 JSON 文本
pub fn param_pairs(param: &Value) -> Result<Vec<(String, String)>, EngineError> {
    match param {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()),
        other => Err(EngineError::InvalidParam(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn build_headers(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        match (
            HeaderName::from_bytes(k.as_bytes()),
            HeaderValue::from_str(v),
        ) {
            (Ok(k), Ok(v)) => {
                map.insert(k, v);
            }
            _ => warn!("Skipping invalid environment header: {}", k),
        }
    }
    map
}

#[async_trait]
impl CaseEngine for ReqwestEngine {
    /// 执行用例请求
    ///
    /// # 参数
    ///
    /// * `environment` - 目标环境
    /// * `case` - 用例
    ///
    /// # 返回值
    ///
    /// * `Ok(CaseResponse)` - 收到响应，无论状态码
    /// * `Err(EngineError)` - 用例定义无效或请求未完成
    async fn execute(
        &self,
        environment: &TargetEnvironment,
        case: &CaseRecord,
    ) -> Result<CaseResponse, EngineError> {
        let method_name = case.request_method.trim().to_ascii_uppercase();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| EngineError::InvalidMethod(case.request_method.clone()))?;
        let url = resolve_url(&environment.base_url, &case.request_path)?;

        let mut request = self
            .client
            .request(method, url.clone())
            .headers(build_headers(&environment.headers));

        request = match case.request_param_type {
            ParamType::Params => request.query(&param_pairs(&case.request_param)?),
            ParamType::Json if case.request_param.is_null() => request,
            ParamType::Json => request.json(&case.request_param),
            ParamType::Data => request.form(&param_pairs(&case.request_param)?),
            ParamType::None => request,
        };

        let start = Instant::now();
        let response = request.send().await?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let mut headers = HashMap::new();
        for (k, v) in response.headers() {
            if let Ok(v_str) = v.to_str() {
                headers.insert(k.as_str().to_string(), v_str.to_string());
            }
        }
        let body = response.text().await?;

        Ok(CaseResponse {
            url: final_url,
            status_code,
            body,
            headers,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
