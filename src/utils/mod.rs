use axum::Json;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::common::ApiResponse;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 权限信息，随访问 token 一起下发
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionInfo {
    pub code: String,
    pub description: String,
}

/// 访问 token 的载荷，验证通过后作为请求上下文传给后续处理器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<String>,
    pub permissions: Vec<PermissionInfo>,
    pub exp: i64, // 过期时间
    pub iat: i64, // 签发时间
}

/// 刷新 token 只携带用户ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub user_id: i64,
    pub exp: i64,
    pub iat: i64,
}

pub fn generate_access_token(
    user_id: i64,
    username: &str,
    roles: Vec<String>,
    permissions: Vec<PermissionInfo>,
    ttl: std::time::Duration,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(ttl.as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = UserClaims {
        user_id,
        username: username.to_string(),
        roles,
        permissions,
        exp: expiration,
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

pub fn generate_refresh_token(
    user_id: i64,
    ttl: std::time::Duration,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(ttl.as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = RefreshClaims {
        user_id,
        exp: expiration,
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// 校验访问 token，签名错误和过期分别返回对应的错误类型。
/// 默认校验带 60 秒的时钟偏差容忍。
pub fn verify_access_token(
    token: &str,
    config: &Config,
) -> Result<UserClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn verify_refresh_token(
    token: &str,
    config: &Config,
) -> Result<RefreshClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// 生成6位数字验证码
pub fn generate_captcha_code() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:06}", code)
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 0,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const USER_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const CAPTCHA_ERROR: i32 = 1005;
    pub const BOOKING_CONFLICT: i32 = 1006;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            redis_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            access_token_expiration_secs: 1800,
            refresh_token_expiration_secs: 7 * 24 * 3600,
            login_access_token_expiration_secs: 3 * 24 * 3600,
            login_refresh_token_expiration_secs: 30 * 24 * 3600,
            captcha_expiration_secs: 300,
            update_user_captcha_expiration_secs: 6000,
            urge_cooldown_secs: 1800,
            server_host: String::new(),
            server_port: 3000,
            api_base_uri: "/api".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_from_name: String::new(),
        }
    }

    #[test]
    fn access_token_roundtrip() {
        let config = test_config();
        let permissions = vec![PermissionInfo {
            code: "ccc".to_string(),
            description: "访问 ccc 接口".to_string(),
        }];

        let token = generate_access_token(
            7,
            "baimin",
            vec!["管理员".to_string()],
            permissions.clone(),
            std::time::Duration::from_secs(1800),
            &config,
        )
        .unwrap();

        let claims = verify_access_token(&token, &config).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "baimin");
        assert_eq!(claims.roles, vec!["管理员".to_string()]);
        assert_eq!(claims.permissions, permissions);
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let config = test_config();
        // 过期时间要早于默认的 60 秒容忍窗口
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            user_id: 1,
            username: "baimin".to_string(),
            roles: vec![],
            permissions: vec![],
            exp: now - 120,
            iat: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        let err = verify_access_token(&token, &config).unwrap_err();
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = test_config();
        let mut other = test_config();
        other.jwt_secret = "other-secret".to_string();

        let token = generate_refresh_token(1, std::time::Duration::from_secs(60), &other).unwrap();
        assert!(verify_refresh_token(&token, &config).is_err());
    }

    #[test]
    fn refresh_token_roundtrip() {
        let config = test_config();
        let token = generate_refresh_token(42, std::time::Duration::from_secs(600), &config).unwrap();
        let claims = verify_refresh_token(&token, &config).unwrap();
        assert_eq!(claims.user_id, 42);
    }

    #[test]
    fn captcha_code_is_six_digits() {
        for _ in 0..32 {
            let code = generate_captcha_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("123456").unwrap();
        assert!(verify_password("123456", &hash).unwrap());
        assert!(!verify_password("654321", &hash).unwrap());
    }
}
