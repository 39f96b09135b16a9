use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    cache::{CaptchaCacheOperations, keys::captcha_keys},
    utils::{
        UserClaims, error_codes, error_to_api_response, generate_access_token,
        generate_captcha_code, generate_refresh_token, hash_password, success_to_api_response,
        verify_password, verify_refresh_token,
    },
};

use super::model::{
    CaptchaQuery, FreezeQuery, LoginRequest, LoginResponse, RefreshTokenQuery,
    RefreshTokenResponse, RegisterUserRequest, UpdatePasswordRequest, UpdateUserRequest, User,
    UserDetailResponse, UserInfo, UserListQuery,
};
use crate::models::common::{PaginatedResponse, Pagination};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> impl IntoResponse {
    // 校验邮箱验证码
    let key = captcha_keys::register_captcha_key(&req.email);
    match CaptchaCacheOperations::fetch(&state.redis, &key).await {
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::CAPTCHA_ERROR, "验证码无效".to_string()),
            );
        }
        Ok(Some(code)) if code != req.captcha => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::CAPTCHA_ERROR, "验证码错误".to_string()),
            );
        }
        Ok(Some(_)) => {}
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "缓存服务异常".to_string()),
            );
        }
    }

    // 用户名唯一
    match User::find_by_username(&state.pool, &req.username).await {
        Ok(Some(_)) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::USER_EXISTS, "用户名已存在".to_string()),
            );
        }
        Ok(None) => {}
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            );
        }
    }

    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "注册失败".to_string()),
            );
        }
    };

    match User::create(&state.pool, &req, &password_hash).await {
        Ok(id) => {
            tracing::info!("registered user {} ({})", req.username, id);
            (
                StatusCode::OK,
                success_to_api_response("注册成功".to_string()),
            )
        }
        Err(e) => {
            tracing::error!("failed to register user: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "注册失败".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn register_captcha(
    State(state): State<AppState>,
    Query(query): Query<CaptchaQuery>,
) -> impl IntoResponse {
    send_captcha(
        &state,
        &captcha_keys::register_captcha_key(&query.email),
        state.config.captcha_expiration_secs,
        &query.email,
        "注册验证码",
    )
    .await
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    login_inner(state, req, false).await
}

/// 管理员登录，额外要求账号带管理员标记
#[axum::debug_handler]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    login_inner(state, req, true).await
}

async fn login_inner(
    state: AppState,
    req: LoginRequest,
    require_admin: bool,
) -> (StatusCode, Json<crate::models::common::ApiResponse<LoginResponse>>) {
    let user = match User::find_by_username(&state.pool, &req.username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::NOT_FOUND, "用户不存在".to_string()),
            );
        }
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            );
        }
    };

    // 管理员入口不暴露普通账号的存在性
    if require_admin && !user.is_admin {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::NOT_FOUND, "用户不存在".to_string()),
        );
    }

    match verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::AUTH_FAILED, "密码错误".to_string()),
            );
        }
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            );
        }
    }

    let (roles, permissions) = match load_identity(&state, user.id).await {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };

    // 登录签发的 token 有效期比刷新接口重新签发的更长
    let access_token = match generate_access_token(
        user.id,
        &user.username,
        roles.clone(),
        permissions.clone(),
        state.config.login_access_token_expiration(),
        &state.config,
    ) {
        Ok(token) => token,
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "生成令牌失败".to_string()),
            );
        }
    };

    let refresh_token = match generate_refresh_token(
        user.id,
        state.config.login_refresh_token_expiration(),
        &state.config,
    ) {
        Ok(token) => token,
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "生成令牌失败".to_string()),
            );
        }
    };

    (
        StatusCode::OK,
        success_to_api_response(LoginResponse {
            user_info: UserInfo {
                id: user.id,
                username: user.username,
                nickname: user.nickname,
                email: user.email,
                head_pic: user.head_pic,
                phone_number: user.phone_number,
                is_frozen: user.is_frozen,
                is_admin: user.is_admin,
                create_time: user.create_time,
                roles,
                permissions,
            },
            access_token,
            refresh_token,
        }),
    )
}

async fn load_identity<T>(
    state: &AppState,
    user_id: i64,
) -> Result<
    (Vec<String>, Vec<crate::utils::PermissionInfo>),
    (StatusCode, Json<crate::models::common::ApiResponse<T>>),
> {
    let roles = User::roles_of(&state.pool, user_id).await.map_err(|_| {
        (
            StatusCode::OK,
            error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
        )
    })?;
    let permissions = User::permissions_of(&state.pool, user_id)
        .await
        .map_err(|_| {
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
        })?;
    Ok((roles, permissions))
}

/// 用有效的刷新 token 重新签发两个 token
#[axum::debug_handler]
pub async fn refresh_token(
    State(state): State<AppState>,
    Query(query): Query<RefreshTokenQuery>,
) -> impl IntoResponse {
    let claims = match verify_refresh_token(&query.refresh_token, &state.config) {
        Ok(claims) => claims,
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                error_to_api_response(error_codes::AUTH_FAILED, "refresh token 无效".to_string()),
            );
        }
    };

    let user = match User::find_by_id(&state.pool, claims.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                error_to_api_response(error_codes::AUTH_FAILED, "refresh token 无效".to_string()),
            );
        }
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            );
        }
    };

    let (roles, permissions) = match load_identity(&state, user.id).await {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };

    let access_token = match generate_access_token(
        user.id,
        &user.username,
        roles,
        permissions,
        state.config.access_token_expiration(),
        &state.config,
    ) {
        Ok(token) => token,
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "生成令牌失败".to_string()),
            );
        }
    };

    let refresh_token = match generate_refresh_token(
        user.id,
        state.config.refresh_token_expiration(),
        &state.config,
    ) {
        Ok(token) => token,
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "生成令牌失败".to_string()),
            );
        }
    };

    (
        StatusCode::OK,
        success_to_api_response(RefreshTokenResponse {
            access_token,
            refresh_token,
        }),
    )
}

#[axum::debug_handler]
pub async fn info(
    Extension(claims): Extension<UserClaims>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match User::find_by_id(&state.pool, claims.user_id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            success_to_api_response(UserDetailResponse {
                id: user.id,
                username: user.username,
                nickname: user.nickname,
                email: user.email,
                head_pic: user.head_pic,
                phone_number: user.phone_number,
                is_frozen: user.is_frozen,
                create_time: user.create_time,
            }),
        ),
        Ok(None) => (
            StatusCode::OK,
            error_to_api_response(error_codes::NOT_FOUND, "用户不存在".to_string()),
        ),
        Err(_) => (
            StatusCode::OK,
            error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
        ),
    }
}

#[axum::debug_handler]
pub async fn update_password(
    State(state): State<AppState>,
    Json(req): Json<UpdatePasswordRequest>,
) -> impl IntoResponse {
    let key = captcha_keys::update_password_captcha_key(&req.email);
    match CaptchaCacheOperations::fetch(&state.redis, &key).await {
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::CAPTCHA_ERROR, "验证码无效".to_string()),
            );
        }
        Ok(Some(code)) if code != req.captcha => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::CAPTCHA_ERROR, "验证码错误".to_string()),
            );
        }
        Ok(Some(_)) => {}
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "缓存服务异常".to_string()),
            );
        }
    }

    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "修改密码失败".to_string()),
            );
        }
    };

    match User::update_password(&state.pool, &req.username, &password_hash).await {
        Ok(0) => (
            StatusCode::OK,
            error_to_api_response(error_codes::NOT_FOUND, "用户不存在".to_string()),
        ),
        Ok(_) => (
            StatusCode::OK,
            success_to_api_response("success".to_string()),
        ),
        Err(e) => {
            tracing::error!("failed to update password: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "修改密码失败".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn update_password_captcha(
    State(state): State<AppState>,
    Query(query): Query<CaptchaQuery>,
) -> impl IntoResponse {
    send_captcha(
        &state,
        &captcha_keys::update_password_captcha_key(&query.email),
        state.config.captcha_expiration_secs,
        &query.email,
        "修改密码验证码",
    )
    .await
}

/// 修改昵称和头像，验证码确认后生效
#[axum::debug_handler]
pub async fn update(
    Extension(claims): Extension<UserClaims>,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let key = captcha_keys::update_user_captcha_key(&req.email);
    match CaptchaCacheOperations::fetch(&state.redis, &key).await {
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::CAPTCHA_ERROR, "验证码已失效".to_string()),
            );
        }
        Ok(Some(code)) if code != req.captcha => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::CAPTCHA_ERROR, "验证码不正确".to_string()),
            );
        }
        Ok(Some(_)) => {}
        Err(_) => {
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "缓存服务异常".to_string()),
            );
        }
    }

    match User::update_profile(
        &state.pool,
        claims.user_id,
        req.nickname.as_deref(),
        req.head_pic.as_deref(),
    )
    .await
    {
        Ok(()) => {
            // 验证码一次有效
            if let Err(e) = CaptchaCacheOperations::invalidate(&state.redis, &key).await {
                tracing::warn!("failed to invalidate captcha: {:?}", e);
            }
            (
                StatusCode::OK,
                success_to_api_response("用户信息修改成功".to_string()),
            )
        }
        Err(e) => {
            tracing::error!("failed to update user profile: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "用户信息修改失败".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn update_captcha(
    State(state): State<AppState>,
    Query(query): Query<CaptchaQuery>,
) -> impl IntoResponse {
    send_captcha(
        &state,
        &captcha_keys::update_user_captcha_key(&query.email),
        state.config.update_user_captcha_expiration_secs,
        &query.email,
        "更改用户信息验证码",
    )
    .await
}

async fn send_captcha(
    state: &AppState,
    key: &str,
    ttl_secs: u64,
    email: &str,
    subject: &str,
) -> (StatusCode, Json<crate::models::common::ApiResponse<String>>) {
    let code = generate_captcha_code();

    if let Err(e) = CaptchaCacheOperations::store(&state.redis, key, &code, ttl_secs).await {
        tracing::error!("failed to store captcha: {:?}", e);
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::INTERNAL_ERROR, "发送验证码失败".to_string()),
        );
    }

    let html = format!("<p>您的验证码是：{}</p>", code);
    match state.email.send_mail(email, subject, &html).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response("success".to_string()),
        ),
        Err(e) => {
            tracing::error!("failed to send captcha mail: {:#}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "发送验证码失败".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn freeze(
    State(state): State<AppState>,
    Query(query): Query<FreezeQuery>,
) -> impl IntoResponse {
    match User::freeze(&state.pool, query.id).await {
        Ok(()) => (
            StatusCode::OK,
            success_to_api_response("success".to_string()),
        ),
        Err(e) => {
            tracing::error!("failed to freeze user {}: {:?}", query.id, e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "冻结用户失败".to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> impl IntoResponse {
    if query.page < 1 {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, "page 不能小于 1".to_string()),
        );
    }

    match User::find_by_page(
        &state.pool,
        query.username.as_deref(),
        query.email.as_deref(),
        query.page,
        query.page_size,
    )
    .await
    {
        Ok((list, total)) => (
            StatusCode::OK,
            success_to_api_response(PaginatedResponse {
                list,
                pagination: Pagination {
                    page: query.page,
                    page_size: query.page_size,
                    total: total as u64,
                },
            }),
        ),
        Err(e) => {
            tracing::error!("failed to list users: {:?}", e);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::INTERNAL_ERROR, "数据库错误".to_string()),
            )
        }
    }
}

/// 测试接口，无需登录或权限
#[axum::debug_handler]
pub async fn aaa() -> impl IntoResponse {
    (StatusCode::OK, success_to_api_response("aaa".to_string()))
}

/// 测试接口，需要登录和 ddd 权限
#[axum::debug_handler]
pub async fn bbb(Extension(claims): Extension<UserClaims>) -> impl IntoResponse {
    (StatusCode::OK, success_to_api_response(claims.username))
}
