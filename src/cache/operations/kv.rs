use std::sync::Arc;

use redis::{AsyncCommands, Client as RedisClient};

/// 基础键值操作，TTL 可选
pub struct KvOperations;

impl KvOperations {
    /// 读取键值，不存在返回 None
    pub async fn get(
        redis: &Arc<RedisClient>,
        key: &str,
    ) -> Result<Option<String>, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(key).await?;
        Ok(result)
    }

    /// 写入键值，传入 TTL 时设置过期时间（秒）
    pub async fn set(
        redis: &Arc<RedisClient>,
        key: &str,
        value: &str,
        ttl_secs: Option<u64>,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        match ttl_secs {
            Some(ttl) => {
                let _: () = conn.set_ex(key, value, ttl).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }

        Ok(())
    }

    /// 删除键
    pub async fn del(redis: &Arc<RedisClient>, key: &str) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let _: () = conn.del(key).await?;

        Ok(())
    }
}
