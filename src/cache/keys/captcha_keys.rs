/// 注册验证码缓存键前缀
const REGISTER_CAPTCHA_PREFIX: &str = "captcha:register:";

/// 修改密码验证码缓存键前缀
const UPDATE_PASSWORD_CAPTCHA_PREFIX: &str = "captcha:update_password:";

/// 修改用户信息验证码缓存键前缀
const UPDATE_USER_CAPTCHA_PREFIX: &str = "captcha:update_user:";

/// 生成注册验证码缓存键
pub fn register_captcha_key(email: &str) -> String {
    format!("{}{}", REGISTER_CAPTCHA_PREFIX, email)
}

/// 生成修改密码验证码缓存键
pub fn update_password_captcha_key(email: &str) -> String {
    format!("{}{}", UPDATE_PASSWORD_CAPTCHA_PREFIX, email)
}

/// 生成修改用户信息验证码缓存键
pub fn update_user_captcha_key(email: &str) -> String {
    format!("{}{}", UPDATE_USER_CAPTCHA_PREFIX, email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_scoped_by_purpose_and_email() {
        assert_eq!(
            register_captcha_key("a@qq.com"),
            "captcha:register:a@qq.com"
        );
        assert_eq!(
            update_password_captcha_key("a@qq.com"),
            "captcha:update_password:a@qq.com"
        );
        assert_ne!(
            register_captcha_key("a@qq.com"),
            update_user_captcha_key("a@qq.com")
        );
    }
}
