/// 催办冷却标记缓存键前缀
const URGE_FLAG_PREFIX: &str = "booking:urge:";

/// 管理员邮箱缓存键
const ADMIN_EMAIL_KEY: &str = "booking:admin_email";

/// 生成催办冷却标记缓存键
pub fn urge_flag_key(booking_id: i64) -> String {
    format!("{}{}", URGE_FLAG_PREFIX, booking_id)
}

/// 管理员邮箱缓存键
pub fn admin_email_key() -> String {
    ADMIN_EMAIL_KEY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urge_keys_are_scoped_by_booking_id() {
        assert_eq!(urge_flag_key(5), "booking:urge:5");
        assert_ne!(urge_flag_key(5), urge_flag_key(6));
    }
}
