use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::database::models::FoodEntity;

const FOOD_COLUMNS: &str =
    "id, merchant, name, intro, cover, category, price, score, status, remark, created_at";

#[derive(Debug, Default)]
pub struct FoodUpdate {
    pub name: Option<String>,
    pub intro: Option<String>,
    pub cover: Option<String>,
    /// `Some(None)` 表示清空分类
    pub category: Option<Option<i64>>,
    pub price: Option<f64>,
    pub status: Option<i16>,
}

/// 美食存储库
pub struct FoodRepository;

impl FoodRepository {
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<FoodEntity>, sqlx::Error> {
        sqlx::query_as::<_, FoodEntity>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// 公开侧只看上架的
    pub async fn find_listed_by_id(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<FoodEntity>, sqlx::Error> {
        sqlx::query_as::<_, FoodEntity>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1 AND status = 1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_merchant_and_name(
        pool: &PgPool,
        merchant: i64,
        name: &str,
    ) -> Result<Option<FoodEntity>, sqlx::Error> {
        sqlx::query_as::<_, FoodEntity>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE merchant = $1 AND name = $2"
        ))
        .bind(merchant)
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(
        pool: &PgPool,
        merchant: i64,
        name: &str,
        intro: &str,
        cover: &str,
        category: Option<i64>,
        price: f64,
        status: i16,
    ) -> Result<FoodEntity, sqlx::Error> {
        sqlx::query_as::<_, FoodEntity>(&format!(
            "INSERT INTO foods (merchant, name, intro, cover, category, price, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {FOOD_COLUMNS}"
        ))
        .bind(merchant)
        .bind(name)
        .bind(intro)
        .bind(cover)
        .bind(category)
        .bind(price)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    /// 商家编辑自己的美食，返回是否命中
    pub async fn update(
        pool: &PgPool,
        id: i64,
        merchant: i64,
        update: &FoodUpdate,
    ) -> Result<bool, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE foods SET ");
        let mut any = false;

        if let Some(v) = &update.name {
            qb.push("name = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.intro {
            if any {
                qb.push(", ");
            }
            qb.push("intro = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.cover {
            if any {
                qb.push(", ");
            }
            qb.push("cover = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = update.category {
            if any {
                qb.push(", ");
            }
            qb.push("category = ").push_bind(v);
            any = true;
        }
        if let Some(v) = update.price {
            if any {
                qb.push(", ");
            }
            qb.push("price = ").push_bind(v);
            any = true;
        }
        if let Some(v) = update.status {
            if any {
                qb.push(", ");
            }
            qb.push("status = ").push_bind(v);
            any = true;
        }

        if !any {
            return Ok(false);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND merchant = ").push_bind(merchant);
        let result = qb.build().execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// 商家删除美食。评价行外键引用美食，同一事务内先清子表再删主表
    pub async fn delete(pool: &PgPool, id: i64, merchant: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM foods WHERE id = $1 AND merchant = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(merchant)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM reviews WHERE target_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM foods WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// 管理员下架
    pub async fn delist(pool: &PgPool, id: i64, remark: Option<&str>) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE foods SET status = 0, remark = $1 WHERE id = $2")
            .bind(remark)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// 商家侧列表，按名称/分类/状态过滤
    pub async fn list_by_merchant(
        pool: &PgPool,
        merchant: i64,
        name: Option<&str>,
        category: Option<i64>,
        status: Option<i16>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FoodEntity>, i64), sqlx::Error> {
        let name_pattern = name.map(|n| format!("%{}%", n));

        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {FOOD_COLUMNS} FROM foods"));
        qb.push(" WHERE merchant = ").push_bind(merchant);
        if let Some(p) = &name_pattern {
            qb.push(" AND name LIKE ").push_bind(p.as_str());
        }
        if let Some(c) = category {
            qb.push(" AND category = ").push_bind(c);
        }
        if let Some(s) = status {
            qb.push(" AND status = ").push_bind(s);
        }
        qb.push(" ORDER BY id LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        let list = qb.build_query_as::<FoodEntity>().fetch_all(pool).await?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM foods");
        count_qb.push(" WHERE merchant = ").push_bind(merchant);
        if let Some(p) = &name_pattern {
            count_qb.push(" AND name LIKE ").push_bind(p.as_str());
        }
        if let Some(c) = category {
            count_qb.push(" AND category = ").push_bind(c);
        }
        if let Some(s) = status {
            count_qb.push(" AND status = ").push_bind(s);
        }
        let total: (i64,) = count_qb.build_query_as().fetch_one(pool).await?;

        Ok((list, total.0))
    }

    /// 首页随机美食
    pub async fn list_random(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FoodEntity>, i64), sqlx::Error> {
        let list = sqlx::query_as::<_, FoodEntity>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE status = 1 \
             ORDER BY RANDOM() LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM foods WHERE status = 1")
            .fetch_one(pool)
            .await?;

        Ok((list, total.0))
    }

    /// 评分排行榜，前 10
    pub async fn rank(pool: &PgPool) -> Result<Vec<FoodEntity>, sqlx::Error> {
        sqlx::query_as::<_, FoodEntity>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE status = 1 AND score <> 0 \
             ORDER BY score DESC LIMIT 10"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn search(
        pool: &PgPool,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<FoodEntity>, i64), sqlx::Error> {
        let pattern = format!("%{}%", term);
        let list = sqlx::query_as::<_, FoodEntity>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE name LIKE $1 AND status = 1 \
             ORDER BY id LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM foods WHERE name LIKE $1 AND status = 1")
                .bind(&pattern)
                .fetch_one(pool)
                .await?;

        Ok((list, total.0))
    }

    /// 重算美食评分：有效评论分数的算术平均，无有效评论时归零
    ///
    /// 评论的新增、改分、删除（作者或管理员）之后都必须调用。
    pub async fn update_score<'e>(
        executor: impl PgExecutor<'e>,
        food_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE foods SET score = ( \
                SELECT COALESCE(AVG(score), 0) FROM reviews \
                WHERE target_id = $1 AND status = 0 AND score IS NOT NULL \
             ) WHERE id = $1",
        )
        .bind(food_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// 商家工作台统计：上架美食数、分类数、有效评论数
    pub async fn merchant_statistic(
        pool: &PgPool,
        merchant: i64,
    ) -> Result<(i64, i64, i64), sqlx::Error> {
        let row: (i64, i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM foods WHERE merchant = $1 AND status = 1), \
                (SELECT COUNT(*) FROM categories WHERE merchant = $1), \
                (SELECT COUNT(*) FROM reviews WHERE merchant_id = $1 AND status = 0)",
        )
        .bind(merchant)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }
}
