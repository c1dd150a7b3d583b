use axum::{
    Json,
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::result::ApiResponse;

/// 记录 5xx 响应体（带请求方法与路径）后原样返回
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    match to_bytes(body, 1024).await {
        Ok(bytes) => {
            error!(
                "{} {} responded {}: {}",
                method,
                path,
                parts.status,
                String::from_utf8_lossy(&bytes)
            );
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            // 响应体读不出来时补发统一格式的空响应，避免给客户端裸 5xx
            error!("{} {} responded {}, body unreadable: {}", method, path, parts.status, e);
            (
                parts.status,
                Json(ApiResponse {
                    code: parts.status.as_u16() as i32,
                    message: "服务器内部错误".to_string(),
                    data: serde_json::json!({}),
                }),
            )
                .into_response()
        }
    }
}
