use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// `verifications` 表整行，一条待审核请求
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VerificationEntity {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub detail: String,
    pub source_id: i64,
    pub status: i16,
    pub remark: Option<String>,
    pub annex: String,
    pub created_at: DateTime<Utc>,
}

/// 管理员列表里联了用户信息的待审核行
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PendingVerification {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub detail: String,
    pub source_id: i64,
    pub status: i16,
    pub remark: Option<String>,
    pub annex: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub nickname: String,
    pub avatar: String,
    pub intro: String,
    pub role: String,
    pub user_status: i16,
    pub user_remark: Option<String>,
}
