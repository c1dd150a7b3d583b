use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::models::{CategoryEntity, CategoryWithCount};

/// 分类存储库
pub struct CategoryRepository;

impl CategoryRepository {
    pub async fn find_by_id(
        pool: &PgPool,
        id: i64,
        merchant: i64,
    ) -> Result<Option<CategoryEntity>, sqlx::Error> {
        sqlx::query_as::<_, CategoryEntity>(
            "SELECT id, merchant, category FROM categories WHERE id = $1 AND merchant = $2",
        )
        .bind(id)
        .bind(merchant)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_merchant_and_name(
        pool: &PgPool,
        merchant: i64,
        name: &str,
    ) -> Result<Option<CategoryEntity>, sqlx::Error> {
        sqlx::query_as::<_, CategoryEntity>(
            "SELECT id, merchant, category FROM categories WHERE merchant = $1 AND category = $2",
        )
        .bind(merchant)
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(
        pool: &PgPool,
        merchant: i64,
        name: &str,
    ) -> Result<CategoryEntity, sqlx::Error> {
        sqlx::query_as::<_, CategoryEntity>(
            "INSERT INTO categories (merchant, category) VALUES ($1, $2) \
             RETURNING id, merchant, category",
        )
        .bind(merchant)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn rename(pool: &PgPool, id: i64, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE categories SET category = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// 删除分类并把该商家关联美食的分类字段清空，两步一个事务
    pub async fn delete_and_detach_foods(
        pool: &PgPool,
        id: i64,
        merchant: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1 AND merchant = $2")
            .bind(id)
            .bind(merchant)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE foods SET category = NULL WHERE merchant = $1 AND category = $2")
            .bind(merchant)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// 分类列表，带每个分类下的美食数
    pub async fn list_with_count(
        pool: &PgPool,
        merchant: i64,
        name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CategoryWithCount>, i64), sqlx::Error> {
        let name_pattern = name.map(|n| format!("%{}%", n));

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT c.id AS id, c.category AS name, COUNT(f.id) AS count \
             FROM categories c \
             LEFT JOIN foods f ON f.category = c.id AND f.merchant = c.merchant \
             WHERE c.merchant = ",
        );
        qb.push_bind(merchant);
        if let Some(p) = &name_pattern {
            qb.push(" AND c.category LIKE ").push_bind(p.as_str());
        }
        qb.push(" GROUP BY c.id ORDER BY c.id LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let list = qb
            .build_query_as::<CategoryWithCount>()
            .fetch_all(pool)
            .await?;

        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM categories WHERE merchant = ");
        count_qb.push_bind(merchant);
        if let Some(p) = &name_pattern {
            count_qb.push(" AND category LIKE ").push_bind(p.as_str());
        }
        let total: (i64,) = count_qb.build_query_as().fetch_one(pool).await?;

        Ok((list, total.0))
    }
}
