use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// `foods` 表整行（1=上架，0=下架）
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FoodEntity {
    pub id: i64,
    pub merchant: i64,
    pub name: String,
    pub intro: String,
    pub cover: String,
    pub category: Option<i64>,
    pub price: f64,
    pub score: f64,
    pub status: i16,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
}
