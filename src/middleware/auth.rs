use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError, utils::verify_access_token};

/// 登录认证中间件，只挂在受保护路由上。
/// 验证通过后把 token 载荷写入请求扩展，供权限守卫和处理器读取。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let Some(authorization) = authorization else {
        return Err(AppError::Unauthenticated);
    };

    let token = authorization
        .strip_prefix("Bearer ")
        .unwrap_or(authorization);

    match verify_access_token(token, &state.config) {
        Ok(claims) => {
            tracing::debug!("authenticated user {} ({})", claims.username, claims.user_id);
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        // 过期和签名错误统一按失效处理
        Err(_) => Err(AppError::SessionInvalid),
    }
}
