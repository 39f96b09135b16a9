use axum::{
    body::to_bytes,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::utils::{error_codes, error_to_api_response};

/// 5xx 响应统一收口：记录原始响应体后重写为标准错误响应，
/// 内部错误细节只进日志，不下发给调用方
pub async fn log_errors(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let status = response.status();
    let body = match to_bytes(response.into_body(), 4096).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::error!("failed to read error response body: {}", e);
            String::new()
        }
    };
    tracing::error!("server error occurred - status: {}, body: {}", status, body);

    (
        status,
        error_to_api_response::<()>(error_codes::INTERNAL_ERROR, "服务器内部错误".to_string()),
    )
        .into_response()
}
