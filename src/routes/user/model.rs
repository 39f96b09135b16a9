use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::utils::PermissionInfo;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub nickname: String,
    pub email: String,
    pub head_pic: Option<String>,
    pub phone_number: Option<String>,
    pub is_frozen: bool,
    pub is_admin: bool,
    pub create_time: DateTime<Utc>,
    pub update_time: Option<DateTime<Utc>>,
}

/// 用户列表项，不携带密码哈希
#[derive(Debug, Serialize, FromRow)]
pub struct UserListItem {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub head_pic: Option<String>,
    pub phone_number: Option<String>,
    pub is_frozen: bool,
    pub is_admin: bool,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub nickname: String,
    pub password: String,
    pub email: String,
    pub captcha: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录返回的用户信息
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub head_pic: Option<String>,
    pub phone_number: Option<String>,
    pub is_frozen: bool,
    pub is_admin: bool,
    pub create_time: DateTime<Utc>,
    pub roles: Vec<String>,
    pub permissions: Vec<PermissionInfo>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_info: UserInfo,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenQuery {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub head_pic: Option<String>,
    pub phone_number: Option<String>,
    pub is_frozen: bool,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub captcha: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub captcha: String,
    pub nickname: Option<String>,
    pub head_pic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CaptchaQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct FreezeQuery {
    pub id: i64,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub username: Option<String>,
    pub email: Option<String>,
}

const USER_COLUMNS: &str = "id, username, password_hash, nickname, email, head_pic, \
     phone_number, is_frozen, is_admin, create_time, update_time";

impl User {
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        req: &RegisterUserRequest,
        password_hash: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password_hash, nickname, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&req.username)
        .bind(password_hash)
        .bind(&req.nickname)
        .bind(&req.email)
        .fetch_one(pool)
        .await
    }

    /// 查询用户的角色名列表
    pub async fn roles_of(pool: &PgPool, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// 查询用户全部角色的权限并按权限码去重
    pub async fn permissions_of(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<PermissionInfo>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT DISTINCT p.code, p.description
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            JOIN user_roles ur ON ur.role_id = rp.role_id
            WHERE ur.user_id = $1
            ORDER BY p.code
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, description)| PermissionInfo { code, description })
            .collect())
    }

    pub async fn update_password(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, update_time = now()
            WHERE username = $2
            "#,
        )
        .bind(password_hash)
        .bind(username)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_profile(
        pool: &PgPool,
        user_id: i64,
        nickname: Option<&str>,
        head_pic: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET nickname = COALESCE($1, nickname),
                head_pic = COALESCE($2, head_pic),
                update_time = now()
            WHERE id = $3
            "#,
        )
        .bind(nickname)
        .bind(head_pic)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn freeze(pool: &PgPool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET is_frozen = true, update_time = now() WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// 分页查询用户，用户名和邮箱支持模糊匹配
    pub async fn find_by_page(
        pool: &PgPool,
        username: Option<&str>,
        email: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<UserListItem>, i64), sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bindings: Vec<String> = Vec::new();

        if let Some(username) = username.filter(|s| !s.is_empty()) {
            bindings.push(format!("%{}%", username));
            conditions.push(format!("username LIKE ${}", bindings.len()));
        }
        if let Some(email) = email.filter(|s| !s.is_empty()) {
            bindings.push(format!("%{}%", email));
            conditions.push(format!("email LIKE ${}", bindings.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for binding in &bindings {
            count_query = count_query.bind(binding);
        }
        let total = count_query.fetch_one(pool).await?;

        let sql = format!(
            "SELECT id, username, nickname, email, head_pic, phone_number, is_frozen, \
             is_admin, create_time FROM users {} ORDER BY id LIMIT ${} OFFSET ${}",
            where_clause,
            bindings.len() + 1,
            bindings.len() + 2,
        );
        let mut query = sqlx::query_as::<_, UserListItem>(&sql);
        for binding in &bindings {
            query = query.bind(binding);
        }
        let list = query
            .bind(page_size as i64)
            .bind(((page - 1) * page_size) as i64)
            .fetch_all(pool)
            .await?;

        Ok((list, total))
    }

    /// 查询第一个管理员的邮箱
    pub async fn find_admin_email(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT email FROM users WHERE is_admin = true ORDER BY id LIMIT 1",
        )
        .fetch_optional(pool)
        .await
    }
}
