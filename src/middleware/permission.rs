use axum::{extract::Request, middleware::Next, response::Response};

use crate::{
    error::AppError,
    utils::{PermissionInfo, UserClaims},
};

/// 权限校验守卫，在认证中间件之后执行。
/// 路由表里通过 `from_fn(move |req, next| permission_guard(REQUIRED, req, next))`
/// 把接口要求的权限码显式挂到对应路由上。
/// 未登录的请求（公开接口）直接放行。
pub async fn permission_guard(
    required: &'static [&'static str],
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(claims) = request.extensions().get::<UserClaims>() {
        // 要求的权限必须全部命中，缺一个即拒绝
        if let Some(missing) = missing_permission(required, &claims.permissions) {
            tracing::info!(
                "user {} denied: missing permission {}",
                claims.username,
                missing
            );
            return Err(AppError::Forbidden);
        }
    }

    Ok(next.run(request).await)
}

/// 返回第一个未授予的权限码
fn missing_permission<'a>(required: &'a [&'a str], granted: &[PermissionInfo]) -> Option<&'a str> {
    required
        .iter()
        .find(|code| !granted.iter().any(|p| p.code == **code))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(codes: &[&str]) -> Vec<PermissionInfo> {
        codes
            .iter()
            .map(|code| PermissionInfo {
                code: code.to_string(),
                description: String::new(),
            })
            .collect()
    }

    #[test]
    fn rejects_when_required_code_is_absent() {
        assert_eq!(missing_permission(&["ddd"], &granted(&["ccc"])), Some("ddd"));
    }

    #[test]
    fn partial_match_still_rejects() {
        assert_eq!(
            missing_permission(&["ccc", "ddd"], &granted(&["ccc"])),
            Some("ddd")
        );
    }

    #[test]
    fn allows_when_all_codes_granted() {
        assert_eq!(
            missing_permission(&["ccc", "ddd"], &granted(&["ddd", "ccc"])),
            None
        );
    }

    #[test]
    fn empty_requirement_allows() {
        assert_eq!(missing_permission(&[], &granted(&[])), None);
    }
}
