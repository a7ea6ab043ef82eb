// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use redis::aio::PubSub;
use redis::{AsyncCommands, RedisResult};

/// Redis客户端
///
/// 为交接存储与事件通道提供键值与发布订阅操作
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// 只解析连接地址，首个命令执行时才真正建立连接
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(RedisError)` - 地址无法解析
    pub fn new(redis_url: &str) -> RedisResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// 检查连接是否可用
    pub async fn ping(&self) -> RedisResult<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut con).await?;
        Ok(())
    }

    /// 获取指定键的值
    ///
    /// # 参数
    ///
    /// * `key` - 键
    ///
    /// # 返回值
    ///
    /// * `Ok(Option<String>)` - 键对应的值，如果不存在则返回None
    /// * `Err(RedisError)` - 获取过程中出现的错误
    pub async fn get(&self, key: &str) -> RedisResult<Option<String>> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.get(key).await
    }

    /// 设置键值对并指定过期时间
    ///
    /// # 参数
    ///
    /// * `key` - 键
    /// * `value` - 值
    /// * `ttl_seconds` - 过期时间（秒）
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> RedisResult<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.set_ex::<_, _, ()>(key, value, ttl_seconds).await
    }

    /// 删除键
    pub async fn del(&self, key: &str) -> RedisResult<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.del::<_, ()>(key).await
    }

    /// 向频道发布消息
    ///
    /// # 返回值
    ///
    /// * `Ok(i64)` - 收到消息的订阅者数量
    pub async fn publish(&self, channel: &str, payload: &str) -> RedisResult<i64> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.publish(channel, payload).await
    }

    /// 订阅频道
    ///
    /// 返回时 SUBSCRIBE 已被服务端确认
    pub async fn subscribe(&self, channel: &str) -> RedisResult<PubSub> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;
        Ok(pubsub)
    }
}
