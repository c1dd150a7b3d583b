use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

/// 统一响应格式 `{ code, message, data }`
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    ok_with(data, "ok")
}

pub fn ok_with<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::OK,
        Json(ApiResponse {
            code: 200,
            message: message.to_string(),
            data,
        }),
    )
}

pub fn created<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            code: 201,
            message: message.to_string(),
            data,
        }),
    )
}
