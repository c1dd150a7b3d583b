use serde::Serialize;
use sqlx::FromRow;

/// `categories` 表整行，`(merchant, category)` 唯一
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryEntity {
    pub id: i64,
    pub merchant: i64,
    pub category: String,
}

/// 分类列表行，带该分类下的美食数量
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub count: i64,
}
