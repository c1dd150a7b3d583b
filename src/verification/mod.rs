//! 审核流水线
//!
//! 一条审核记录的状态机：`Pending(2) → Approved(0) | Rejected(3)`，
//! 到达终态后不再流转。每次流转对 `verifications` 与 `users` 的写入
//! 共用同一个事务，要么全部生效要么全部回滚；通知邮件在事务提交后
//! 异步发出，失败只记日志。

use sqlx::PgPool;

use crate::auth::{Capability, MerchantStatus, Principal, Role, UserStatus, VerificationStatus};
use crate::database::models::{UserEntity, VerificationEntity};
use crate::database::operations::{ModeratedField, UserRepository, VerificationRepository};
use crate::error::AppError;
use crate::mail::{MailData, MailTemplate, Mailer};
use crate::utils;

/// 审核记录的主体类型，对应 `verifications.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    User,
    Merchant,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::User => "user",
            SubjectKind::Merchant => "merchant",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(SubjectKind::User),
            "merchant" => Some(SubjectKind::Merchant),
            _ => None,
        }
    }

    /// 角色对应的审核记录类型（普通用户的记录类型是 `user` 而非 `normal`）
    pub fn for_role(role: Role) -> Option<Self> {
        match role {
            Role::Normal => Some(SubjectKind::User),
            Role::Merchant => Some(SubjectKind::Merchant),
            Role::Admin => None,
        }
    }

    /// 审核该类型记录所需的能力标签
    pub fn required_capability(&self) -> Capability {
        match self {
            SubjectKind::User => Capability::User,
            SubjectKind::Merchant => Capability::Merchant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub fn terminal_status(&self) -> VerificationStatus {
        match self {
            Verdict::Approve => VerificationStatus::Approved,
            Verdict::Reject => VerificationStatus::Rejected,
        }
    }
}

/// 流转对主体实体产生的副作用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectEffect {
    /// 商家注册通过：转为正常营业
    ActivateMerchant,
    /// 商家注册驳回：转为驳回态
    DisableMerchant,
    /// 资料字段驳回：把乐观生效的值重置为系统默认
    ResetField(ModeratedField),
    /// 资料字段通过：提交时已写入，纯状态翻转
    None,
}

/// 按记录类型、字段与裁决计算副作用
pub fn transition_effect(
    kind: SubjectKind,
    detail: &str,
    verdict: Verdict,
) -> Result<SubjectEffect, AppError> {
    if kind == SubjectKind::Merchant && detail == "register" {
        return Ok(match verdict {
            Verdict::Approve => SubjectEffect::ActivateMerchant,
            Verdict::Reject => SubjectEffect::DisableMerchant,
        });
    }

    match ModeratedField::parse(detail) {
        Some(field) => Ok(match verdict {
            Verdict::Approve => SubjectEffect::None,
            Verdict::Reject => SubjectEffect::ResetField(field),
        }),
        None => Err(AppError::InvalidArgument(format!(
            "未知的审核类型: {}",
            detail
        ))),
    }
}

/// 流转前的权限校验：能力标签须与记录类型匹配，且禁止审核自己的记录
pub fn authorize_resolution(
    admin: &Principal,
    kind: SubjectKind,
    source_id: i64,
) -> Result<(), AppError> {
    admin.require(kind.required_capability())?;
    if admin.uid == source_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// 封禁目标角色所需的能力标签，管理员不可被封禁
pub fn ban_capability(target_role: Role) -> Result<Capability, AppError> {
    match target_role {
        Role::Normal => Ok(Capability::User),
        Role::Merchant => Ok(Capability::Merchant),
        Role::Admin => Err(AppError::Forbidden),
    }
}

fn ensure_pending(status: i16) -> Result<(), AppError> {
    match VerificationStatus::from_i16(status) {
        Some(VerificationStatus::Pending) => Ok(()),
        Some(_) => Err(AppError::AlreadyResolved),
        None => Err(AppError::Internal(format!(
            "verification in unknown status {}",
            status
        ))),
    }
}

/// 商家注册申请的资料字段
#[derive(Debug)]
pub struct MerchantApplication {
    pub nickname: String,
    pub avatar: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub annex: String,
}

/// 商家提交注册申请
///
/// 事务内：资料暂存到用户行、状态转“申请中”、插入待审核记录；
/// 提交成功后发送申请确认邮件。
pub async fn submit_merchant_application(
    pool: &PgPool,
    mailer: &Mailer,
    subject: &UserEntity,
    application: MerchantApplication,
) -> Result<VerificationEntity, AppError> {
    match MerchantStatus::from_i16(subject.status) {
        Some(MerchantStatus::Rejected) | Some(MerchantStatus::Deregistered) => {}
        Some(MerchantStatus::Applying) => {
            return Err(AppError::Conflict("申请审核中，请勿重复提交".into()));
        }
        Some(MerchantStatus::Active) => {
            return Err(AppError::Conflict("商家已通过审核".into()));
        }
        _ => return Err(AppError::Forbidden),
    }

    let mut tx = pool.begin().await?;

    if VerificationRepository::has_pending(&mut tx, subject.uid, "merchant", "register").await? {
        return Err(AppError::Conflict("已有待审核的申请".into()));
    }

    UserRepository::stage_merchant_application(
        &mut tx,
        subject.uid,
        &application.nickname,
        &application.avatar,
        &application.phone,
        &application.email,
        &application.address,
        &application.annex,
    )
    .await?;

    let record = VerificationRepository::insert(
        &mut tx,
        "merchant",
        "register",
        subject.uid,
        &application.annex,
    )
    .await?;

    tx.commit().await?;

    mailer.spawn_send(
        &application.email,
        MailTemplate::Apply,
        MailData {
            username: subject.username.clone(),
            remark: None,
        },
    );

    Ok(record)
}

/// 普通用户提交需审核的资料修改（昵称/头像/简介）
///
/// 新值乐观写入用户行，与审核记录的插入共用一个事务。
pub async fn submit_user_field_edit(
    pool: &PgPool,
    subject_uid: i64,
    field: ModeratedField,
    value: &str,
) -> Result<VerificationEntity, AppError> {
    let mut tx = pool.begin().await?;

    if VerificationRepository::has_pending(&mut tx, subject_uid, "user", field.detail()).await? {
        return Err(AppError::Conflict("该项修改正在审核中".into()));
    }

    UserRepository::stage_field(&mut tx, subject_uid, field, value).await?;
    let record =
        VerificationRepository::insert(&mut tx, "user", field.detail(), subject_uid, "").await?;

    tx.commit().await?;
    Ok(record)
}

/// 管理员审核：通过或驳回一条待审核记录
///
/// 行锁下复读状态，非 Pending 一律 `AlreadyResolved` 且不产生任何写入。
pub async fn resolve(
    pool: &PgPool,
    mailer: &Mailer,
    admin: &Principal,
    record_id: i64,
    verdict: Verdict,
    remark: Option<&str>,
) -> Result<VerificationEntity, AppError> {
    let mut tx = pool.begin().await?;

    let record = VerificationRepository::find_for_update(&mut tx, record_id)
        .await?
        .ok_or_else(|| AppError::NotFound("审核记录不存在".into()))?;

    let kind = SubjectKind::parse(&record.kind).ok_or_else(|| {
        AppError::Internal(format!("verification {} has unknown type {}", record.id, record.kind))
    })?;

    authorize_resolution(admin, kind, record.source_id)?;
    ensure_pending(record.status)?;

    let effect = transition_effect(kind, &record.detail, verdict)?;

    VerificationRepository::resolve(&mut tx, record.id, verdict.terminal_status(), remark).await?;

    match effect {
        SubjectEffect::ActivateMerchant => {
            UserRepository::set_status(&mut tx, record.source_id, MerchantStatus::Active.as_i16())
                .await?;
        }
        SubjectEffect::DisableMerchant => {
            UserRepository::set_status(
                &mut tx,
                record.source_id,
                MerchantStatus::Rejected.as_i16(),
            )
            .await?;
        }
        SubjectEffect::ResetField(field) => {
            let placeholder = match field {
                ModeratedField::Nickname => utils::random_nickname(),
                ModeratedField::Avatar => utils::DEFAULT_AVATAR.to_string(),
                ModeratedField::Intro => utils::DEFAULT_INTRO.to_string(),
            };
            UserRepository::stage_field(&mut tx, record.source_id, field, &placeholder).await?;
        }
        SubjectEffect::None => {}
    }

    tx.commit().await?;

    tracing::info!(
        "verification {} ({}/{}) resolved as {:?} by admin {}",
        record.id,
        record.kind,
        record.detail,
        verdict,
        admin.uid
    );

    // 注册审核通知邮件，事务提交后异步发出
    if record.detail == "register" {
        if let Some(subject) = UserRepository::find_by_uid(pool, record.source_id).await? {
            let template = match verdict {
                Verdict::Approve => MailTemplate::Approve,
                Verdict::Reject => MailTemplate::Reject,
            };
            mailer.spawn_send(
                &subject.email,
                template,
                MailData {
                    username: subject.username,
                    remark: remark.map(str::to_string),
                },
            );
        }
    }

    let mut resolved = record;
    resolved.status = verdict.terminal_status().as_i16();
    resolved.remark = remark.map(str::to_string);
    Ok(resolved)
}

/// 封禁用户或商家
///
/// 同一事务内：主体状态转封禁，且其同类型的待审核记录全部驳回，
/// 封禁隐含驳回未决请求。
pub async fn ban_subject(
    pool: &PgPool,
    admin: &Principal,
    target_uid: i64,
    target_role: Role,
) -> Result<(), AppError> {
    admin.require(ban_capability(target_role)?)?;
    if admin.uid == target_uid {
        return Err(AppError::Forbidden);
    }

    let mut tx = pool.begin().await?;

    let subject = UserRepository::find_by_uid_for_update(&mut tx, target_uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    if subject.role != target_role.as_str() {
        return Err(AppError::NotFound("用户不存在".into()));
    }

    // 驳回用 `verifications.type` 过滤，普通用户的记录类型是 "user"
    let kind = SubjectKind::for_role(target_role).ok_or(AppError::Forbidden)?;

    UserRepository::set_status(&mut tx, target_uid, UserStatus::Banned.as_i16()).await?;
    let rejected =
        VerificationRepository::reject_all_pending(&mut tx, target_uid, kind.as_str(), "账号已被封禁")
            .await?;

    tx.commit().await?;

    tracing::info!(
        "subject {} banned by admin {}, {} pending verification(s) rejected",
        target_uid,
        admin.uid,
        rejected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PermissionSet;

    fn admin(uid: i64, raw: &str) -> Principal {
        Principal {
            uid,
            username: format!("admin{}", uid),
            role: Role::Admin,
            permissions: PermissionSet::parse(raw),
            status: 0,
        }
    }

    #[test]
    fn ban_filters_pending_records_by_subject_kind() {
        // 普通用户的审核记录类型是 "user"，不能拿角色串去匹配
        assert_eq!(SubjectKind::for_role(Role::Normal), Some(SubjectKind::User));
        assert_eq!(
            SubjectKind::for_role(Role::Normal).unwrap().as_str(),
            "user"
        );
        assert_eq!(
            SubjectKind::for_role(Role::Merchant),
            Some(SubjectKind::Merchant)
        );
        assert_eq!(SubjectKind::for_role(Role::Admin), None);
    }

    #[test]
    fn register_approval_activates_merchant() {
        let effect =
            transition_effect(SubjectKind::Merchant, "register", Verdict::Approve).unwrap();
        assert_eq!(effect, SubjectEffect::ActivateMerchant);
    }

    #[test]
    fn register_rejection_disables_merchant() {
        let effect =
            transition_effect(SubjectKind::Merchant, "register", Verdict::Reject).unwrap();
        assert_eq!(effect, SubjectEffect::DisableMerchant);
    }

    #[test]
    fn field_approval_is_pure_status_flip() {
        let effect = transition_effect(SubjectKind::User, "nickname", Verdict::Approve).unwrap();
        assert_eq!(effect, SubjectEffect::None);
    }

    #[test]
    fn field_rejection_resets_staged_value() {
        let effect = transition_effect(SubjectKind::User, "avatar", Verdict::Reject).unwrap();
        assert_eq!(effect, SubjectEffect::ResetField(ModeratedField::Avatar));
    }

    #[test]
    fn unknown_detail_is_invalid_argument() {
        assert!(matches!(
            transition_effect(SubjectKind::User, "password", Verdict::Approve),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn capability_must_match_record_type() {
        let content_admin = admin(1, "content");
        assert!(matches!(
            authorize_resolution(&content_admin, SubjectKind::Merchant, 9),
            Err(AppError::Forbidden)
        ));

        let merchant_admin = admin(1, "merchant");
        assert!(authorize_resolution(&merchant_admin, SubjectKind::Merchant, 9).is_ok());

        let super_admin = admin(1, "super");
        assert!(authorize_resolution(&super_admin, SubjectKind::User, 9).is_ok());
    }

    #[test]
    fn self_moderation_is_refused() {
        let p = admin(7, "super");
        assert!(matches!(
            authorize_resolution(&p, SubjectKind::User, 7),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn terminal_record_fails_already_resolved() {
        assert!(ensure_pending(VerificationStatus::Pending.as_i16()).is_ok());
        assert!(matches!(
            ensure_pending(VerificationStatus::Approved.as_i16()),
            Err(AppError::AlreadyResolved)
        ));
        assert!(matches!(
            ensure_pending(VerificationStatus::Rejected.as_i16()),
            Err(AppError::AlreadyResolved)
        ));
    }

    #[test]
    fn admins_cannot_be_banned() {
        assert!(matches!(ban_capability(Role::Admin), Err(AppError::Forbidden)));
        assert_eq!(ban_capability(Role::Normal).unwrap(), Capability::User);
        assert_eq!(ban_capability(Role::Merchant).unwrap(), Capability::Merchant);
    }
}
