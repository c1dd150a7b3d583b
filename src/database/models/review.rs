use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// `reviews` 表整行，删除是状态流转（0=正常，2=管理员删除，3=作者删除）
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewEntity {
    pub id: i64,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub target_id: i64,
    pub merchant_id: i64,
    pub content: String,
    pub score: Option<f64>,
    pub anonymity: i16,
    pub annex: String,
    pub status: i16,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 美食详情页的评论行，联了作者信息
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewWithAuthor {
    pub id: i64,
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub target_id: i64,
    pub content: String,
    pub score: Option<f64>,
    pub anonymity: i16,
    pub annex: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
}
