use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// `users` 表整行，普通用户、商家、管理员共用，靠 `role` 区分
///
/// `password` 永远是 bcrypt 哈希，出站序列化时一律跳过。
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserEntity {
    pub uid: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub permission: String,
    pub nickname: String,
    pub avatar: String,
    pub intro: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub annex: String,
    pub remark: Option<String>,
    pub status: i16,
    pub created_at: DateTime<Utc>,
}

/// 搜索、评论关联等场景下的用户摘要
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummary {
    pub uid: i64,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
    pub intro: String,
}

/// 管理员列表行，带权限串
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminRow {
    pub uid: i64,
    pub username: String,
    pub permission: String,
    pub status: i16,
    pub remark: Option<String>,
}
