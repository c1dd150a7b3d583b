use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::database::models::{AdminRow, UserEntity, UserSummary};

const USER_COLUMNS: &str = "uid, username, password, role, permission, nickname, avatar, intro, \
     phone, email, address, annex, remark, status, created_at";

/// 普通用户可自助修改的资料字段，None 表示本次不修改
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// 仅商家直接生效；普通用户的昵称/头像/简介走审核流程
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub intro: Option<String>,
}

/// 走审核流程的资料字段
///
/// 提交时乐观写入 `users` 行，同事务插入审核记录；
/// 驳回时被系统默认值覆盖。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeratedField {
    Nickname,
    Avatar,
    Intro,
}

impl ModeratedField {
    pub fn detail(&self) -> &'static str {
        match self {
            ModeratedField::Nickname => "nickname",
            ModeratedField::Avatar => "avatar",
            ModeratedField::Intro => "intro",
        }
    }

    pub fn parse(detail: &str) -> Option<Self> {
        match detail {
            "nickname" => Some(ModeratedField::Nickname),
            "avatar" => Some(ModeratedField::Avatar),
            "intro" => Some(ModeratedField::Intro),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        // detail 与列名一致，但经由枚举转换，SQL 里永远不拼接外部输入
        self.detail()
    }
}

/// 用户存储库
pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_uid(pool: &PgPool, uid: i64) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE uid = $1"
        ))
        .bind(uid)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// 注册普通用户，昵称由调用方生成（随机默认昵称）
    pub async fn create_normal(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
        nickname: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!(
            "INSERT INTO users (username, password, role, nickname, status) \
             VALUES ($1, $2, 'normal', $3, 0) RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .bind(nickname)
        .fetch_one(pool)
        .await
    }

    /// 注册商家账号，初始为“驳回/未申请”态，提交申请后进入审核
    pub async fn create_merchant(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!(
            "INSERT INTO users (username, password, role, status) \
             VALUES ($1, $2, 'merchant', 4) RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await
    }

    pub async fn create_admin(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
        permission: &str,
        remark: Option<&str>,
    ) -> Result<UserEntity, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!(
            "INSERT INTO users (username, password, role, permission, status, remark) \
             VALUES ($1, $2, 'admin', $3, 0, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .bind(permission)
        .bind(remark)
        .fetch_one(pool)
        .await
    }

    pub async fn list_admins(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AdminRow>, i64), sqlx::Error> {
        let list = sqlx::query_as::<_, AdminRow>(
            "SELECT uid, username, permission, status, remark FROM users \
             WHERE role = 'admin' ORDER BY uid LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(pool)
                .await?;

        Ok((list, total.0))
    }

    /// 管理员编辑管理员（用户名/密码/权限串/状态/备注）
    pub async fn update_admin(
        pool: &PgPool,
        uid: i64,
        username: Option<&str>,
        password_hash: Option<&str>,
        permission: Option<&str>,
        status: Option<i16>,
        remark: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut any = false;

        if let Some(v) = username {
            qb.push("username = ").push_bind(v);
            any = true;
        }
        if let Some(v) = password_hash {
            if any {
                qb.push(", ");
            }
            qb.push("password = ").push_bind(v);
            any = true;
        }
        if let Some(v) = permission {
            if any {
                qb.push(", ");
            }
            qb.push("permission = ").push_bind(v);
            any = true;
        }
        if let Some(v) = status {
            if any {
                qb.push(", ");
            }
            qb.push("status = ").push_bind(v);
            any = true;
        }
        if let Some(v) = remark {
            if any {
                qb.push(", ");
            }
            qb.push("remark = ").push_bind(v);
            any = true;
        }

        if !any {
            return Ok(());
        }

        qb.push(" WHERE uid = ").push_bind(uid);
        qb.push(" AND role = 'admin'");
        qb.build().execute(pool).await?;
        Ok(())
    }

    pub async fn search_normal_users(
        pool: &PgPool,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserSummary>, i64), sqlx::Error> {
        let pattern = format!("%{}%", term);
        let list = sqlx::query_as::<_, UserSummary>(
            "SELECT uid, username, nickname, avatar, intro FROM users \
             WHERE (username LIKE $1 OR nickname LIKE $1) \
             AND status = 0 AND role = 'normal' \
             ORDER BY uid LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users \
             WHERE (username LIKE $1 OR nickname LIKE $1) \
             AND status = 0 AND role = 'normal'",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        Ok((list, total.0))
    }

    /// 游客侧商家搜索，只返回营业中的商家
    pub async fn search_merchants(
        pool: &PgPool,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserSummary>, i64), sqlx::Error> {
        let pattern = format!("%{}%", term);
        let list = sqlx::query_as::<_, UserSummary>(
            "SELECT uid, username, nickname, avatar, intro FROM users \
             WHERE nickname LIKE $1 AND status = 0 AND role = 'merchant' \
             ORDER BY uid LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users \
             WHERE nickname LIKE $1 AND status = 0 AND role = 'merchant'",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        Ok((list, total.0))
    }

    /// 直接生效的资料字段更新（不走审核）
    pub async fn update_profile(
        pool: &PgPool,
        uid: i64,
        update: &ProfileUpdate,
    ) -> Result<(), sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut any = false;

        if let Some(v) = &update.username {
            qb.push("username = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.password {
            if any {
                qb.push(", ");
            }
            qb.push("password = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.phone {
            if any {
                qb.push(", ");
            }
            qb.push("phone = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.email {
            if any {
                qb.push(", ");
            }
            qb.push("email = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.address {
            if any {
                qb.push(", ");
            }
            qb.push("address = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.nickname {
            if any {
                qb.push(", ");
            }
            qb.push("nickname = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.avatar {
            if any {
                qb.push(", ");
            }
            qb.push("avatar = ").push_bind(v.as_str());
            any = true;
        }
        if let Some(v) = &update.intro {
            if any {
                qb.push(", ");
            }
            qb.push("intro = ").push_bind(v.as_str());
            any = true;
        }

        if !any {
            return Ok(());
        }

        qb.push(" WHERE uid = ").push_bind(uid);
        qb.build().execute(pool).await?;
        Ok(())
    }

    /// 事务内按 uid 取用户行并加行锁
    pub async fn find_by_uid_for_update(
        tx: &mut Transaction<'_, Postgres>,
        uid: i64,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE uid = $1 FOR UPDATE"
        ))
        .bind(uid)
        .fetch_optional(&mut **tx)
        .await
    }

    /// 事务内写入待审核字段的新值（乐观生效）
    pub async fn stage_field(
        tx: &mut Transaction<'_, Postgres>,
        uid: i64,
        field: ModeratedField,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        let sql = format!("UPDATE users SET {} = $1 WHERE uid = $2", field.column());
        sqlx::query(&sql)
            .bind(value)
            .bind(uid)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// 事务内修改用户状态（审核流转、封禁的副作用）
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        uid: i64,
        status: i16,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET status = $1 WHERE uid = $2")
            .bind(status)
            .bind(uid)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// 商家申请提交：事务内暂存资料并转入“申请中”
    pub async fn stage_merchant_application(
        tx: &mut Transaction<'_, Postgres>,
        uid: i64,
        nickname: &str,
        avatar: &str,
        phone: &str,
        email: &str,
        address: &str,
        annex: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET nickname = $1, avatar = $2, phone = $3, email = $4, \
             address = $5, annex = $6, status = 1 WHERE uid = $7",
        )
        .bind(nickname)
        .bind(avatar)
        .bind(phone)
        .bind(email)
        .bind(address)
        .bind(annex)
        .bind(uid)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
