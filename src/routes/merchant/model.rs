use serde::{Deserialize, Serialize};

use crate::routes::Pagination;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// 商家入驻申请的资料
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub nickname: String,
    pub avatar: Option<String>,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// 资质附件，须指向配置的 CDN
    pub annex: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInfoRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub intro: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatisticResponse {
    pub food: i64,
    pub category: i64,
    pub review: i64,
}

#[derive(Debug, Deserialize)]
pub struct FoodListQuery {
    pub name: Option<String>,
    pub category: Option<i64>,
    pub status: Option<i16>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl FoodListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            size: self.size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddFoodRequest {
    pub name: String,
    pub intro: Option<String>,
    pub cover: Option<String>,
    pub category: Option<i64>,
    pub price: f64,
    pub status: Option<i16>,
}

#[derive(Debug, Deserialize)]
pub struct EditFoodRequest {
    pub id: i64,
    pub name: Option<String>,
    pub intro: Option<String>,
    pub cover: Option<String>,
    /// 显式传 null 清空分类时用 `clear_category`
    pub category: Option<i64>,
    pub clear_category: Option<bool>,
    pub price: Option<f64>,
    pub status: Option<i16>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFoodQuery {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl CategoryListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            size: self.size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddCategoryRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct EditCategoryRequest {
    pub id: i64,
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCategoryQuery {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub food: Option<i64>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl ReviewListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            size: self.size,
        }
    }
}
