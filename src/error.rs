use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 全局错误类型
///
/// 校验类错误在 handler 内直接返回；数据库、邮件等内部错误
/// 通过 `From` 转换为 `Internal`，对外只暴露统一的提示语。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("需要提供 Token")]
    Unauthenticated,
    #[error("无效的 Token")]
    InvalidToken,
    #[error("未授权的操作")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Conflict(String),
    #[error("该记录已审核，禁止重复操作")]
    AlreadyResolved,
    #[error("服务器内部错误")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(format!("database error: {}", e))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("bcrypt error: {}", e))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("jwt error: {}", e))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    message: String,
    data: serde_json::Value,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::AlreadyResolved => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!("internal error: {}", detail);
        }

        let status = self.status_code();
        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            message: self.to_string(),
            data: serde_json::json!({}),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_taxonomy() {
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::NotFound("用户不存在".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::AlreadyResolved.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_message_is_opaque() {
        let err = AppError::Internal("connection refused at 10.0.0.1".into());
        assert_eq!(err.to_string(), "服务器内部错误");
    }
}
