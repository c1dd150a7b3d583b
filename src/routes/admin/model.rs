use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub username: String,
    pub password: String,
    /// `+` 连接的权限串，如 `user+content`
    pub permission: String,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdminRequest {
    pub uid: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub permission: Option<String>,
    pub status: Option<i16>,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub id: i64,
    /// `approve` 或 `reject`
    pub verdict: String,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub uid: i64,
    /// `normal` 或 `merchant`
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReviewQuery {
    pub id: i64,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DelistFoodQuery {
    pub id: i64,
    pub remark: Option<String>,
}
