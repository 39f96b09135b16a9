use std::sync::Arc;

use redis::Client as RedisClient;

use super::kv::KvOperations;

/// 验证码缓存操作
pub struct CaptchaCacheOperations;

impl CaptchaCacheOperations {
    /// 缓存验证码，过期时间由调用方按用途决定
    pub async fn store(
        redis: &Arc<RedisClient>,
        key: &str,
        code: &str,
        ttl_secs: u64,
    ) -> Result<(), redis::RedisError> {
        KvOperations::set(redis, key, code, Some(ttl_secs)).await
    }

    /// 读取验证码，过期或未发送返回 None
    pub async fn fetch(
        redis: &Arc<RedisClient>,
        key: &str,
    ) -> Result<Option<String>, redis::RedisError> {
        KvOperations::get(redis, key).await
    }

    /// 验证通过后清除验证码
    pub async fn invalidate(
        redis: &Arc<RedisClient>,
        key: &str,
    ) -> Result<(), redis::RedisError> {
        KvOperations::del(redis, key).await
    }
}
