use sqlx::{PgPool, Postgres, Transaction};

use crate::auth::VerificationStatus;
use crate::database::models::{PendingVerification, VerificationEntity};

const VERIFICATION_COLUMNS: &str =
    "id, type, detail, source_id, status, remark, annex, created_at";

/// 审核记录存储库
///
/// 审核流转的写操作全部要求事务句柄，
/// 与 `users` 表的副作用写入共用同一个事务。
pub struct VerificationRepository;

impl VerificationRepository {
    /// 事务内按 ID 取记录并加行锁，两次并发审核只会有一次拿到 Pending
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> Result<Option<VerificationEntity>, sqlx::Error> {
        sqlx::query_as::<_, VerificationEntity>(&format!(
            "SELECT {VERIFICATION_COLUMNS} FROM verifications WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// 同一主体、同一类型、同一字段是否已有待审核记录
    pub async fn has_pending(
        tx: &mut Transaction<'_, Postgres>,
        source_id: i64,
        kind: &str,
        detail: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM verifications \
             WHERE source_id = $1 AND type = $2 AND detail = $3 AND status = 2 LIMIT 1",
        )
        .bind(source_id)
        .bind(kind)
        .bind(detail)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.is_some())
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        kind: &str,
        detail: &str,
        source_id: i64,
        annex: &str,
    ) -> Result<VerificationEntity, sqlx::Error> {
        sqlx::query_as::<_, VerificationEntity>(&format!(
            "INSERT INTO verifications (type, detail, source_id, status, annex) \
             VALUES ($1, $2, $3, 2, $4) RETURNING {VERIFICATION_COLUMNS}"
        ))
        .bind(kind)
        .bind(detail)
        .bind(source_id)
        .bind(annex)
        .fetch_one(&mut **tx)
        .await
    }

    /// 事务内把记录流转到终态
    pub async fn resolve(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        status: VerificationStatus,
        remark: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE verifications SET status = $1, remark = $2 WHERE id = $3")
            .bind(status.as_i16())
            .bind(remark)
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// 封禁联动：该主体同类型的所有待审核记录一并驳回
    pub async fn reject_all_pending(
        tx: &mut Transaction<'_, Postgres>,
        source_id: i64,
        kind: &str,
        remark: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE verifications SET status = 3, remark = $1 \
             WHERE source_id = $2 AND type = $3 AND status = 2",
        )
        .bind(remark)
        .bind(source_id)
        .bind(kind)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// 待审核列表（管理员侧），联用户信息
    pub async fn list_pending(
        pool: &PgPool,
        kind: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PendingVerification>, i64), sqlx::Error> {
        let list = sqlx::query_as::<_, PendingVerification>(
            "SELECT v.id, v.type, v.detail, v.source_id, v.status, v.remark, v.annex, \
                    v.created_at, u.username, u.nickname, u.avatar, u.intro, u.role, \
                    u.status AS user_status, u.remark AS user_remark \
             FROM verifications v \
             LEFT JOIN users u ON u.uid = v.source_id \
             WHERE v.type = $1 AND v.status = 2 \
             ORDER BY v.id LIMIT $2 OFFSET $3",
        )
        .bind(kind)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM verifications WHERE type = $1 AND status = 2",
        )
        .bind(kind)
        .fetch_one(pool)
        .await?;

        Ok((list, total.0))
    }
}
