// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// 目标环境
///
/// 用例请求发往的被测系统，同一时刻只有一个环境处于当前状态
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TargetEnvironment {
    pub id: i64,
    #[validate(length(min = 1, message = "environment name cannot be empty"))]
    pub name: String,
    #[validate(url(message = "environment base_url is invalid"))]
    pub base_url: String,
    /// 每个请求附带的公共请求头
    pub headers: HashMap<String, String>,
    pub is_current: bool,
}

impl TargetEnvironment {
    /// 校验环境是否可用于执行用例
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 环境有效
    /// * `Err(DomainError)` - 名称为空或基础地址无效
    pub fn ensure_valid(&self) -> Result<(), DomainError> {
        self.validate().map_err(DomainError::from)
    }
}
