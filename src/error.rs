use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

/// 认证与鉴权中间件直接中断请求时返回的错误
#[derive(Debug)]
pub enum AppError {
    /// 接口要求登录但请求未携带凭证
    Unauthenticated,
    /// 凭证无效或已过期，两种情况对外不做区分
    SessionInvalid,
    /// 已登录但缺少接口要求的权限
    Forbidden,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "用户未登录",
            ),
            AppError::SessionInvalid => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "token 失效，请重新登录",
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                error_codes::PERMISSION_DENIED,
                "您没有权限访问",
            ),
        };

        (status, error_to_api_response::<()>(code, msg.to_string())).into_response()
    }
}
