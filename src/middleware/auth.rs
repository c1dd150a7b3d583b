use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::auth::{Principal, Role, verify_token};
use crate::error::AppError;

/// 各角色允许访问的路径前缀（相对 API 根）
fn role_prefix(role: Role) -> &'static str {
    match role {
        Role::Normal => "/user",
        Role::Merchant => "/merchant",
        Role::Admin => "/admin",
    }
}

/// 角色前缀下无需登录的路径
const PUBLIC_PATHS: &[&str] = &[
    "/user/register",
    "/user/login",
    "/user/available",
    "/user/search",
    "/merchant/register",
];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || path.starts_with("/common")
}

/// 受保护 = 落在某个角色前缀下且不在公开白名单里
fn is_protected(path: &str) -> bool {
    (path.starts_with("/user") || path.starts_with("/merchant") || path.starts_with("/admin"))
        && !is_public(path)
}

/// 网关裁决
#[derive(Debug, PartialEq, Eq)]
enum GateDecision {
    /// 放行，无身份
    Anonymous,
    /// 放行并挂载身份
    Authenticated,
    Deny(DenyReason),
}

#[derive(Debug, PartialEq, Eq)]
enum DenyReason {
    Unauthenticated,
    Forbidden,
}

/// 粗粒度的角色-前缀裁决；能力标签、资源归属由各 handler 自查
fn decide(path: &str, role: Option<Role>) -> GateDecision {
    match role {
        None => {
            if is_protected(path) {
                GateDecision::Deny(DenyReason::Unauthenticated)
            } else {
                GateDecision::Anonymous
            }
        }
        Some(role) => {
            // 角色前缀命中，或公开路径上的“可选登录”访问
            if path.starts_with(role_prefix(role)) || !is_protected(path) {
                GateDecision::Authenticated
            } else {
                GateDecision::Deny(DenyReason::Forbidden)
            }
        }
    }
}

/// 认证网关，挂在整个 API 路由之前
///
/// Token 验证通过后把 [`Principal`] 放进请求扩展，
/// 权限串只在这里拆分一次，下游不再处理原始字符串。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let full_path = req.uri().path().to_string();
    let path = full_path
        .strip_prefix(state.config.api_base_uri.as_str())
        .unwrap_or(&full_path);

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let principal: Option<Principal> = match token {
        None => None,
        Some(token) => {
            let claims = verify_token(token, &state.config)?;
            Some(claims.into_principal()?)
        }
    };

    match decide(path, principal.as_ref().map(|p| p.role)) {
        GateDecision::Anonymous => Ok(next.run(req).await),
        GateDecision::Authenticated => {
            if let Some(p) = principal {
                req.extensions_mut().insert(p);
            }
            Ok(next.run(req).await)
        }
        GateDecision::Deny(DenyReason::Unauthenticated) => Err(AppError::Unauthenticated),
        GateDecision::Deny(DenyReason::Forbidden) => Err(AppError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_on_protected_path_is_unauthenticated() {
        assert_eq!(
            decide("/user/info", None),
            GateDecision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            decide("/admin/verification", None),
            GateDecision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn anonymous_on_public_path_passes() {
        assert_eq!(decide("/user/register", None), GateDecision::Anonymous);
        assert_eq!(decide("/merchant/register", None), GateDecision::Anonymous);
        assert_eq!(decide("/common/rank", None), GateDecision::Anonymous);
    }

    #[test]
    fn role_prefix_must_match() {
        assert_eq!(
            decide("/admin/verification", Some(Role::Normal)),
            GateDecision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(
            decide("/user/info", Some(Role::Normal)),
            GateDecision::Authenticated
        );
        assert_eq!(
            decide("/merchant/food", Some(Role::Merchant)),
            GateDecision::Authenticated
        );
        assert_eq!(
            decide("/merchant/food", Some(Role::Admin)),
            GateDecision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn authenticated_user_can_still_reach_public_paths() {
        // 公开路径上带着有效身份访问：放行并保留身份
        assert_eq!(
            decide("/common/food", Some(Role::Merchant)),
            GateDecision::Authenticated
        );
        assert_eq!(
            decide("/user/search", Some(Role::Merchant)),
            GateDecision::Authenticated
        );
    }
}
