use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{FoodEntity, ReviewWithAuthor, UserSummary};
use crate::routes::Pagination;
use crate::utils;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
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

#[derive(Debug, Deserialize)]
pub struct FoodDetailQuery {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct FoodDetailResponse {
    pub food: FoodEntity,
    pub merchant: Option<UserSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewTreeQuery {
    pub id: i64,
}

/// 评论树节点，匿名评论在出口处抹掉作者身份
#[derive(Debug, Serialize)]
pub struct ReviewNode {
    pub id: i64,
    pub author_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub content: String,
    pub score: Option<f64>,
    pub anonymity: i16,
    pub annex: String,
    pub created_at: DateTime<Utc>,
    pub username: Option<String>,
    pub nickname: String,
    pub avatar: String,
    pub children: Vec<ReviewNode>,
}

impl ReviewNode {
    fn from_row(row: &ReviewWithAuthor) -> Self {
        let anonymous = row.anonymity == 1;
        ReviewNode {
            id: row.id,
            author_id: if anonymous { None } else { Some(row.author_id) },
            parent_id: row.parent_id,
            content: row.content.clone(),
            score: row.score,
            anonymity: row.anonymity,
            annex: row.annex.clone(),
            created_at: row.created_at,
            username: if anonymous {
                None
            } else {
                Some(row.username.clone())
            },
            nickname: if anonymous {
                "匿名用户".to_string()
            } else {
                row.nickname.clone()
            },
            avatar: if anonymous {
                utils::DEFAULT_AVATAR.to_string()
            } else {
                row.avatar.clone()
            },
            children: Vec::new(),
        }
    }
}

/// 按 `parent_id` 把平铺的评论行组装成两层树
///
/// 行按 id 升序传入，父节点必然先于回复出现；父节点已不可见的
/// 回复（父评论被删除）直接丢弃。
pub fn build_review_tree(rows: &[ReviewWithAuthor]) -> Vec<ReviewNode> {
    let mut roots: Vec<ReviewNode> = Vec::new();

    for row in rows {
        match row.parent_id {
            None => roots.push(ReviewNode::from_row(row)),
            Some(parent) => {
                if let Some(node) = roots.iter_mut().find(|n| n.id == parent) {
                    node.children.push(ReviewNode::from_row(row));
                }
            }
        }
    }

    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(id: i64, parent_id: Option<i64>, anonymity: i16) -> ReviewWithAuthor {
        ReviewWithAuthor {
            id,
            author_id: 42,
            parent_id,
            target_id: 1,
            content: "好吃".to_string(),
            score: Some(5.0),
            anonymity,
            annex: String::new(),
            created_at: Utc::now(),
            username: "alice".to_string(),
            nickname: "爱丽丝".to_string(),
            avatar: "https://cdn.example.com/a.png".to_string(),
        }
    }

    #[test]
    fn replies_attach_to_parent() {
        let rows = vec![row(1, None, 0), row(2, Some(1), 0), row(3, None, 0)];
        let tree = build_review_tree(&rows);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, 2);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn orphan_replies_are_dropped() {
        let rows = vec![row(1, None, 0), row(2, Some(99), 0)];
        let tree = build_review_tree(&rows);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn anonymous_rows_hide_author_identity() {
        let rows = vec![row(1, None, 1)];
        let tree = build_review_tree(&rows);

        assert_eq!(tree[0].author_id, None);
        assert_eq!(tree[0].username, None);
        assert_eq!(tree[0].nickname, "匿名用户");
        assert_eq!(tree[0].avatar, utils::DEFAULT_AVATAR);
    }

    #[test]
    fn named_rows_keep_author_identity() {
        let rows = vec![row(1, None, 0)];
        let tree = build_review_tree(&rows);

        assert_eq!(tree[0].author_id, Some(42));
        assert_eq!(tree[0].nickname, "爱丽丝");
    }
}
