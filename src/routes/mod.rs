pub mod admin;
pub mod common;
pub mod merchant;
pub mod user;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MAX_PAGE_SIZE: i64 = 300;

/// 分页参数，page 从 1 开始，size 上限 300
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl Pagination {
    /// 返回 `(page, limit, offset)`
    pub fn normalize(&self) -> Result<(i64, i64, i64), AppError> {
        let page = self.page.unwrap_or(1);
        let size = self.size.unwrap_or(10);

        if page <= 0 || size <= 0 {
            return Err(AppError::InvalidArgument("非法的分页参数".into()));
        }

        let limit = size.min(MAX_PAGE_SIZE);
        Ok((page, limit, (page - 1) * limit))
    }
}

/// 分页响应体
#[derive(Debug, Serialize)]
pub struct Paged<T: Serialize> {
    pub list: Vec<T>,
    pub total: i64,
    pub current: i64,
    pub size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let p = Pagination {
            page: None,
            size: None,
        };
        assert_eq!(p.normalize().unwrap(), (1, 10, 0));
    }

    #[test]
    fn size_is_capped() {
        let p = Pagination {
            page: Some(2),
            size: Some(1000),
        };
        assert_eq!(p.normalize().unwrap(), (2, 300, 300));
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let p = Pagination {
            page: Some(0),
            size: Some(10),
        };
        assert!(p.normalize().is_err());

        let p = Pagination {
            page: Some(1),
            size: Some(-5),
        };
        assert!(p.normalize().is_err());
    }
}
