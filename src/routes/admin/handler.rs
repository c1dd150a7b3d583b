use axum::{
    extract::{Extension, Json, Path, Query, State},
    response::IntoResponse,
};

use crate::AppState;
use crate::auth::{Capability, PermissionSet, Principal, ReviewStatus, Role, UserStatus};
use crate::database::operations::{FoodRepository, ReviewRepository, UserRepository, VerificationRepository};
use crate::error::AppError;
use crate::result;
use crate::routes::{Paged, Pagination};
use crate::utils;
use crate::verification::{self, SubjectKind, Verdict};

use super::model::{
    BanRequest, CreateAdminRequest, DeleteReviewQuery, DelistFoodQuery, ResolveRequest,
    UpdateAdminRequest,
};

pub async fn get_info(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::find_by_uid(&state.pool, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    Ok(result::ok(user))
}

/// 管理员列表，仅超级管理员可见
pub async fn list_admins(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Capability::Super)?;
    let (page, limit, offset) = pagination.normalize()?;

    let (list, total) = UserRepository::list_admins(&state.pool, limit, offset).await?;

    Ok(result::ok(Paged {
        list,
        total,
        current: page,
        size: limit,
    }))
}

/// 新建管理员账号，权限串在入库前规范化
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Capability::Super)?;

    if !utils::is_username_valid(&req.username) {
        return Err(AppError::InvalidArgument("非法的用户名".into()));
    }
    if !utils::is_password_valid(&req.password) {
        return Err(AppError::InvalidArgument("非法的密码".into()));
    }
    if UserRepository::find_by_username(&state.pool, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("用户名已被占用".into()));
    }

    let permission = PermissionSet::parse(&req.permission).to_storage();
    let hashed = utils::hash_password(&req.password)?;
    let admin = UserRepository::create_admin(
        &state.pool,
        &req.username,
        &hashed,
        &permission,
        req.remark.as_deref(),
    )
    .await?;

    Ok(result::created(admin, "创建成功"))
}

pub async fn update_admin(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Capability::Super)?;

    let target = UserRepository::find_by_uid(&state.pool, req.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("管理员不存在".into()))?;
    if target.role != Role::Admin.as_str() {
        return Err(AppError::NotFound("管理员不存在".into()));
    }

    if let Some(username) = &req.username {
        if !utils::is_username_valid(username) {
            return Err(AppError::InvalidArgument("非法的用户名".into()));
        }
        if let Some(existing) = UserRepository::find_by_username(&state.pool, username).await? {
            if existing.uid != req.uid {
                return Err(AppError::Conflict("用户名已被占用".into()));
            }
        }
    }

    let hashed = match &req.password {
        Some(password) => {
            if !utils::is_password_valid(password) {
                return Err(AppError::InvalidArgument("非法的密码".into()));
            }
            Some(utils::hash_password(password)?)
        }
        None => None,
    };
    if let Some(status) = req.status {
        if UserStatus::from_i16(status).is_none() {
            return Err(AppError::InvalidArgument("非法的账号状态".into()));
        }
    }
    let permission = req
        .permission
        .as_deref()
        .map(|p| PermissionSet::parse(p).to_storage());

    UserRepository::update_admin(
        &state.pool,
        req.uid,
        req.username.as_deref(),
        hashed.as_deref(),
        permission.as_deref(),
        req.status,
        req.remark.as_deref(),
    )
    .await?;

    Ok(result::ok_with((), "修改成功"))
}

/// 待审核列表，按类型分栏，需持有对应权限
pub async fn list_verifications(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let kind = SubjectKind::parse(&kind)
        .ok_or_else(|| AppError::InvalidArgument("非法的审核类型".into()))?;
    principal.require(kind.required_capability())?;

    let (page, limit, offset) = pagination.normalize()?;
    let (list, total) =
        VerificationRepository::list_pending(&state.pool, kind.as_str(), limit, offset).await?;

    Ok(result::ok(Paged {
        list,
        total,
        current: page,
        size: limit,
    }))
}

pub async fn resolve_verification(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ResolveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let verdict = match req.verdict.as_str() {
        "approve" => Verdict::Approve,
        "reject" => Verdict::Reject,
        _ => return Err(AppError::InvalidArgument("非法的审核结论".into())),
    };

    let resolved = verification::resolve(
        &state.pool,
        &state.mailer,
        &principal,
        req.id,
        verdict,
        req.remark.as_deref(),
    )
    .await?;

    Ok(result::ok_with(resolved, "审核完成"))
}

pub async fn ban(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<BanRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = Role::parse(&req.role)
        .filter(|r| *r != Role::Admin)
        .ok_or_else(|| AppError::InvalidArgument("非法的用户角色".into()))?;

    verification::ban_subject(&state.pool, &principal, req.uid, role).await?;

    Ok(result::ok_with((), "封禁成功"))
}

/// 管理员删除违规评论并重算评分
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<DeleteReviewQuery>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Capability::Content)?;

    let review = ReviewRepository::find_by_id(&state.pool, query.id)
        .await?
        .ok_or_else(|| AppError::NotFound("评论不存在".into()))?;
    if review.status != ReviewStatus::Active.as_i16() {
        return Err(AppError::NotFound("评论不存在".into()));
    }

    ReviewRepository::set_status(
        &state.pool,
        query.id,
        ReviewStatus::AdminDeleted.as_i16(),
        query.remark.as_deref(),
    )
    .await?;
    FoodRepository::update_score(&state.pool, review.target_id).await?;

    Ok(result::ok_with((), "删除成功"))
}

/// 强制下架美食，仅超级管理员
pub async fn delist_food(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<DelistFoodQuery>,
) -> Result<impl IntoResponse, AppError> {
    principal.require(Capability::Super)?;

    FoodRepository::find_by_id(&state.pool, query.id)
        .await?
        .ok_or_else(|| AppError::NotFound("美食不存在".into()))?;

    FoodRepository::delist(&state.pool, query.id, query.remark.as_deref()).await?;

    Ok(result::ok_with((), "下架成功"))
}
