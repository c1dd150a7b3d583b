use serde::{Deserialize, Serialize};

use crate::database::models::UserEntity;
use crate::routes::Pagination;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserEntity,
}

#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AvailableResponse {
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            size: self.size,
        }
    }
}

/// 资料编辑请求
///
/// username/password/phone/email 即时生效；
/// nickname/avatar/intro 走审核流程，乐观生效并生成审核记录。
#[derive(Debug, Deserialize)]
pub struct UpdateInfoRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub intro: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// 带 id 表示编辑已有评论
    pub id: Option<i64>,
    pub content: Option<String>,
    pub target: Option<i64>,
    pub parent: Option<i64>,
    pub merchant: Option<i64>,
    pub score: Option<f64>,
    pub anonymity: Option<i16>,
    pub annex: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReviewQuery {
    pub id: i64,
}
