use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    // token 有效期，单位秒
    pub access_token_expiration_secs: u64,
    pub refresh_token_expiration_secs: u64,
    pub login_access_token_expiration_secs: u64,
    pub login_refresh_token_expiration_secs: u64,
    pub captcha_expiration_secs: u64,
    pub update_user_captcha_expiration_secs: u64,
    pub urge_cooldown_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from_name: String,
}

fn env_secs(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            // 刷新接口重新签发的 token 较短，登录签发的较长
            access_token_expiration_secs: env_secs("ACCESS_TOKEN_EXPIRATION", 30 * 60),
            refresh_token_expiration_secs: env_secs("REFRESH_TOKEN_EXPIRATION", 7 * 24 * 3600),
            login_access_token_expiration_secs: env_secs(
                "LOGIN_ACCESS_TOKEN_EXPIRATION",
                3 * 24 * 3600,
            ),
            login_refresh_token_expiration_secs: env_secs(
                "LOGIN_REFRESH_TOKEN_EXPIRATION",
                30 * 24 * 3600,
            ),
            captcha_expiration_secs: env_secs("CAPTCHA_EXPIRATION", 5 * 60),
            update_user_captcha_expiration_secs: env_secs("UPDATE_USER_CAPTCHA_EXPIRATION", 6000),
            urge_cooldown_secs: env_secs("URGE_COOLDOWN", 30 * 60),
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".to_string()),
            smtp_host: env::var("SMTP_HOST")?,
            smtp_port: env::var("SMTP_PORT")?.parse().unwrap_or(587),
            smtp_username: env::var("SMTP_USERNAME")?,
            smtp_password: env::var("SMTP_PASSWORD")?,
            smtp_from_name: env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "会议室预定系统".to_string()),
        })
    }

    pub fn access_token_expiration(&self) -> Duration {
        Duration::from_secs(self.access_token_expiration_secs)
    }

    pub fn refresh_token_expiration(&self) -> Duration {
        Duration::from_secs(self.refresh_token_expiration_secs)
    }

    pub fn login_access_token_expiration(&self) -> Duration {
        Duration::from_secs(self.login_access_token_expiration_secs)
    }

    pub fn login_refresh_token_expiration(&self) -> Duration {
        Duration::from_secs(self.login_refresh_token_expiration_secs)
    }
}
