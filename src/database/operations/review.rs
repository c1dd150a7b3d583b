use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::database::models::{ReviewEntity, ReviewWithAuthor};

const REVIEW_COLUMNS: &str = "id, author_id, parent_id, target_id, merchant_id, content, \
     score, anonymity, annex, status, remark, created_at";

#[derive(Debug, Default)]
pub struct NewReview {
    pub author_id: i64,
    pub parent_id: Option<i64>,
    pub target_id: i64,
    pub merchant_id: i64,
    pub content: String,
    pub score: Option<f64>,
    pub anonymity: i16,
    pub annex: String,
}

/// 评论存储库
pub struct ReviewRepository;

impl ReviewRepository {
    pub async fn find_by_id(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<ReviewEntity>, sqlx::Error> {
        sqlx::query_as::<_, ReviewEntity>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(pool: &PgPool, review: &NewReview) -> Result<ReviewEntity, sqlx::Error> {
        sqlx::query_as::<_, ReviewEntity>(&format!(
            "INSERT INTO reviews (author_id, parent_id, target_id, merchant_id, content, \
             score, anonymity, annex, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0) RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.author_id)
        .bind(review.parent_id)
        .bind(review.target_id)
        .bind(review.merchant_id)
        .bind(&review.content)
        .bind(review.score)
        .bind(review.anonymity)
        .bind(&review.annex)
        .fetch_one(pool)
        .await
    }

    /// 作者编辑自己的评论
    pub async fn update(
        pool: &PgPool,
        id: i64,
        content: Option<&str>,
        score: Option<f64>,
        anonymity: Option<i16>,
    ) -> Result<(), sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE reviews SET ");
        let mut any = false;

        if let Some(v) = content {
            qb.push("content = ").push_bind(v);
            any = true;
        }
        if let Some(v) = score {
            if any {
                qb.push(", ");
            }
            qb.push("score = ").push_bind(v);
            any = true;
        }
        if let Some(v) = anonymity {
            if any {
                qb.push(", ");
            }
            qb.push("anonymity = ").push_bind(v);
            any = true;
        }

        if !any {
            return Ok(());
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(pool).await?;
        Ok(())
    }

    /// 软删除：状态流转 + 备注，行保留
    pub async fn set_status<'e>(
        executor: impl PgExecutor<'e>,
        id: i64,
        status: i16,
        remark: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reviews SET status = $1, remark = $2 WHERE id = $3")
            .bind(status)
            .bind(remark)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list_by_author(
        pool: &PgPool,
        author_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ReviewEntity>, i64), sqlx::Error> {
        let list = sqlx::query_as::<_, ReviewEntity>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE author_id = $1 AND status = 0 \
             ORDER BY id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reviews WHERE author_id = $1 AND status = 0",
        )
        .bind(author_id)
        .fetch_one(pool)
        .await?;

        Ok((list, total.0))
    }

    pub async fn list_by_merchant(
        pool: &PgPool,
        merchant_id: i64,
        food_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ReviewEntity>, i64), sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE merchant_id = "
        ));
        qb.push_bind(merchant_id);
        qb.push(" AND status = 0");
        if let Some(food) = food_id {
            qb.push(" AND target_id = ").push_bind(food);
        }
        qb.push(" ORDER BY id DESC LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let list = qb.build_query_as::<ReviewEntity>().fetch_all(pool).await?;

        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reviews WHERE merchant_id = ");
        count_qb.push_bind(merchant_id);
        count_qb.push(" AND status = 0");
        if let Some(food) = food_id {
            count_qb.push(" AND target_id = ").push_bind(food);
        }
        let total: (i64,) = count_qb.build_query_as().fetch_one(pool).await?;

        Ok((list, total.0))
    }

    /// 美食详情页的全部有效评论（含回复），联作者信息
    pub async fn list_active_by_food(
        pool: &PgPool,
        food_id: i64,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.author_id, r.parent_id, r.target_id, r.content, r.score, \
                    r.anonymity, r.annex, r.created_at, u.username, u.nickname, u.avatar \
             FROM reviews r \
             LEFT JOIN users u ON u.uid = r.author_id \
             WHERE r.target_id = $1 AND r.status = 0 \
             ORDER BY r.id",
        )
        .bind(food_id)
        .fetch_all(pool)
        .await
    }
}
