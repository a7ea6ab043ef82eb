// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 请求参数的编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// 作为查询字符串发送
    #[default]
    Params,
    /// 作为 JSON 请求体发送
    Json,
    /// 作为表单请求体发送
    Data,
    /// 不携带参数
    None,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamType::Params => write!(f, "params"),
            ParamType::Json => write!(f, "json"),
            ParamType::Data => write!(f, "data"),
            ParamType::None => write!(f, "none"),
        }
    }
}

impl FromStr for ParamType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "params" | "query" => Ok(ParamType::Params),
            "json" => Ok(ParamType::Json),
            "data" | "form" => Ok(ParamType::Data),
            "" | "none" => Ok(ParamType::None),
            _ => Err(()),
        }
    }
}

/// 测试用例记录
///
/// 在提交时按值捕获的单条用例定义，工作器只读取这份副本，
/// 不会再回查数据库。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// 用例ID
    pub id: i64,
    /// 用例标题
    pub title: String,
    /// 用例描述
    pub description: String,
    /// 所属模块
    pub module: String,
    /// 编写人
    pub editor: String,
    /// HTTP方法
    pub request_method: String,
    /// 请求路径，相对于目标环境的基础地址
    pub request_path: String,
    /// 参数编码方式
    pub request_param_type: ParamType,
    /// 请求参数
    pub request_param: serde_json::Value,
    /// 期望的响应状态码
    pub expected_status_code: u16,
}

/// 快照错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// 没有任何用例
    #[error("case snapshot cannot be empty")]
    Empty,
}

/// 用例快照
///
/// 提交时捕获的有序用例列表。构造后不可变，序列化时即为用例数组。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CaseRecord>", into = "Vec<CaseRecord>")]
pub struct CaseSnapshot {
    cases: Vec<CaseRecord>,
}

impl CaseSnapshot {
    /// 捕获用例快照
    ///
    /// # 参数
    ///
    /// * `records` - 按执行顺序排列的用例
    ///
    /// # 返回值
    ///
    /// * `Ok(CaseSnapshot)` - 快照
    /// * `Err(SnapshotError::Empty)` - 用例列表为空
    pub fn capture(records: Vec<CaseRecord>) -> Result<Self, SnapshotError> {
        if records.is_empty() {
            return Err(SnapshotError::Empty);
        }
        Ok(Self { cases: records })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaseRecord> {
        self.cases.iter()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl TryFrom<Vec<CaseRecord>> for CaseSnapshot {
    type Error = SnapshotError;

    fn try_from(records: Vec<CaseRecord>) -> Result<Self, Self::Error> {
        Self::capture(records)
    }
}

impl From<CaseSnapshot> for Vec<CaseRecord> {
    fn from(snapshot: CaseSnapshot) -> Self {
        snapshot.cases
    }
}

impl<'a> IntoIterator for &'a CaseSnapshot {
    type Item = &'a CaseRecord;
    type IntoIter = std::slice::Iter<'a, CaseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}
