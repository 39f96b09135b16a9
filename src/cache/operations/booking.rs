use std::sync::Arc;

use redis::Client as RedisClient;

use super::kv::KvOperations;
use crate::cache::keys::booking_keys;

/// 预定相关的缓存操作
pub struct BookingCacheOperations;

impl BookingCacheOperations {
    /// 查询催办冷却标记是否存在
    pub async fn urge_flag_set(
        redis: &Arc<RedisClient>,
        booking_id: i64,
    ) -> Result<bool, redis::RedisError> {
        let flag = KvOperations::get(redis, &booking_keys::urge_flag_key(booking_id)).await?;
        Ok(flag.is_some())
    }

    /// 设置催办冷却标记
    pub async fn set_urge_flag(
        redis: &Arc<RedisClient>,
        booking_id: i64,
        cooldown_secs: u64,
    ) -> Result<(), redis::RedisError> {
        KvOperations::set(
            redis,
            &booking_keys::urge_flag_key(booking_id),
            "1",
            Some(cooldown_secs),
        )
        .await
    }

    /// 读取缓存的管理员邮箱
    pub async fn get_admin_email(
        redis: &Arc<RedisClient>,
    ) -> Result<Option<String>, redis::RedisError> {
        KvOperations::get(redis, &booking_keys::admin_email_key()).await
    }

    /// 缓存管理员邮箱，不设置过期时间
    pub async fn cache_admin_email(
        redis: &Arc<RedisClient>,
        email: &str,
    ) -> Result<(), redis::RedisError> {
        KvOperations::set(redis, &booking_keys::admin_email_key(), email, None).await
    }
}
