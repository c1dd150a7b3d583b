use axum::{
    extract::{Extension, Json, Query, State},
    response::IntoResponse,
};

use crate::AppState;
use crate::auth::{MerchantStatus, Principal, ReviewStatus, UserStatus, sign_token};
use crate::database::operations::{
    FoodRepository, ModeratedField, NewReview, ProfileUpdate, ReviewRepository, UserRepository,
};
use crate::error::AppError;
use crate::result;
use crate::routes::Paged;
use crate::utils;
use crate::verification;

use super::model::{
    AuthResponse, AvailableQuery, AvailableResponse, DeleteReviewQuery, LoginRequest,
    RegisterRequest, ReviewRequest, SearchQuery, UpdateInfoRequest,
};

/// 普通用户注册
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
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

    let hashed = utils::hash_password(&req.password)?;
    let user = UserRepository::create_normal(
        &state.pool,
        &req.username,
        &hashed,
        &utils::random_nickname(),
    )
    .await?;
    let token = sign_token(
        user.uid,
        &user.username,
        &user.role,
        &user.permission,
        user.status,
        &state.config,
    )?;

    Ok(result::created(AuthResponse { token, user }, "注册成功"))
}

/// 登录，三种角色共用
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::find_by_username(&state.pool, &req.username)
        .await?
        .ok_or_else(|| AppError::InvalidArgument("用户名或密码错误".into()))?;

    if !utils::verify_password(&req.password, &user.password)? {
        return Err(AppError::InvalidArgument("用户名或密码错误".into()));
    }
    if user.status == UserStatus::Banned.as_i16() {
        return Err(AppError::Forbidden);
    }

    let token = sign_token(
        user.uid,
        &user.username,
        &user.role,
        &user.permission,
        user.status,
        &state.config,
    )?;

    Ok(result::ok_with(AuthResponse { token, user }, "登录成功"))
}

/// 用户名可用性查询
pub async fn available(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> Result<impl IntoResponse, AppError> {
    let taken = UserRepository::find_by_username(&state.pool, &query.username)
        .await?
        .is_some();

    Ok(result::ok(AvailableResponse { available: !taken }))
}

/// 按用户名或昵称搜索普通用户
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let term = query
        .term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidArgument("请输入搜索内容".into()))?;
    let (page, limit, offset) = query.pagination().normalize()?;

    let (list, total) =
        UserRepository::search_normal_users(&state.pool, term, limit, offset).await?;

    Ok(result::ok_with(
        Paged {
            list,
            total,
            current: page,
            size: limit,
        },
        "获取成功",
    ))
}

/// 当前用户信息
pub async fn get_info(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::find_by_uid(&state.pool, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    Ok(result::ok(user))
}

/// 编辑资料
///
/// 即时字段直接落库；昵称、头像、简介走审核流水线，
/// 乐观生效的同时生成待审核记录。
pub async fn update_info(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateInfoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::find_by_uid(&state.pool, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    let mut update = ProfileUpdate::default();

    if let Some(username) = &req.username {
        if username != &user.username {
            if !utils::is_username_valid(username) {
                return Err(AppError::InvalidArgument("非法的用户名".into()));
            }
            if UserRepository::find_by_username(&state.pool, username)
                .await?
                .is_some()
            {
                return Err(AppError::Conflict("用户名已被占用".into()));
            }
            update.username = Some(username.clone());
        }
    }
    if let Some(password) = &req.password {
        if !utils::is_password_valid(password) {
            return Err(AppError::InvalidArgument("非法的密码".into()));
        }
        update.password = Some(utils::hash_password(password)?);
    }
    if let Some(phone) = &req.phone {
        if !utils::is_phone_valid(phone) {
            return Err(AppError::InvalidArgument("非法的手机号".into()));
        }
        update.phone = Some(phone.clone());
    }
    if let Some(email) = &req.email {
        if !utils::is_email_valid(email) {
            return Err(AppError::InvalidArgument("非法的邮箱".into()));
        }
        update.email = Some(email.clone());
    }

    UserRepository::update_profile(&state.pool, principal.uid, &update).await?;

    // 审核字段逐项提交，互不阻塞
    if let Some(nickname) = &req.nickname {
        if !utils::is_nickname_valid(nickname) {
            return Err(AppError::InvalidArgument("非法的昵称".into()));
        }
        verification::submit_user_field_edit(
            &state.pool,
            principal.uid,
            ModeratedField::Nickname,
            nickname.trim(),
        )
        .await?;
    }
    if let Some(avatar) = &req.avatar {
        if !avatar.starts_with(&state.config.cdn_prefix) {
            return Err(AppError::InvalidArgument("非法的头像地址".into()));
        }
        verification::submit_user_field_edit(
            &state.pool,
            principal.uid,
            ModeratedField::Avatar,
            avatar,
        )
        .await?;
    }
    if let Some(intro) = &req.intro {
        let intro = intro.trim();
        if intro.chars().count() > 100 {
            return Err(AppError::InvalidArgument("简介长度不能超过100".into()));
        }
        verification::submit_user_field_edit(
            &state.pool,
            principal.uid,
            ModeratedField::Intro,
            intro,
        )
        .await?;
    }

    let user = UserRepository::find_by_uid(&state.pool, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    Ok(result::ok(user))
}

/// 当前用户的评论列表
pub async fn list_reviews(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(pagination): Query<crate::routes::Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let (page, limit, offset) = pagination.normalize()?;
    let (list, total) =
        ReviewRepository::list_by_author(&state.pool, principal.uid, limit, offset).await?;

    Ok(result::ok_with(
        Paged {
            list,
            total,
            current: page,
            size: limit,
        },
        "获取成功",
    ))
}

fn validate_content(content: &str) -> Result<String, AppError> {
    let content = content.trim().to_string();
    let len = content.chars().count();
    if !(5..=200).contains(&len) {
        return Err(AppError::InvalidArgument(
            "评论内容长度必须在5到200之间".into(),
        ));
    }
    Ok(content)
}

fn validate_score(score: f64) -> Result<(), AppError> {
    if !(0.0..=5.0).contains(&score) {
        return Err(AppError::InvalidArgument("评分必须在0到5之间".into()));
    }
    Ok(())
}

/// 发表或编辑评论，带 id 即编辑
pub async fn post_review(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(id) = req.id {
        return edit_review(state, principal, id, req).await;
    }

    let target = req
        .target
        .ok_or_else(|| AppError::InvalidArgument("非法的操作".into()))?;
    let merchant = req
        .merchant
        .ok_or_else(|| AppError::InvalidArgument("非法的操作".into()))?;
    let content = validate_content(
        req.content
            .as_deref()
            .ok_or_else(|| AppError::InvalidArgument("评论内容不能为空".into()))?,
    )?;

    // 根评论必须打分，回复可不打
    if req.parent.is_none() && req.score.is_none() {
        return Err(AppError::InvalidArgument("非法的操作".into()));
    }
    if let Some(score) = req.score {
        validate_score(score)?;
    }

    let anonymity = req.anonymity.unwrap_or(0);
    if anonymity != 0 && anonymity != 1 {
        return Err(AppError::InvalidArgument("非法的操作".into()));
    }

    if let Some(parent) = req.parent {
        let parent_review = ReviewRepository::find_by_id(&state.pool, parent)
            .await?
            .filter(|r| r.status == ReviewStatus::Active.as_i16())
            .ok_or_else(|| AppError::NotFound("评论不存在".into()))?;
        if parent_review.target_id != target {
            return Err(AppError::InvalidArgument("非法的操作".into()));
        }
    }

    FoodRepository::find_listed_by_id(&state.pool, target)
        .await?
        .ok_or_else(|| AppError::NotFound("美食不存在".into()))?;

    let merchant_user = UserRepository::find_by_uid(&state.pool, merchant)
        .await?
        .filter(|u| u.role == "merchant" && u.status == MerchantStatus::Active.as_i16())
        .ok_or_else(|| AppError::NotFound("未找到商家".into()))?;

    let annex = req.annex.unwrap_or_default();
    if !annex.is_empty() && !annex.starts_with(&state.config.cdn_prefix) {
        return Err(AppError::InvalidArgument("非法的附件".into()));
    }

    let review = ReviewRepository::insert(
        &state.pool,
        &NewReview {
            author_id: principal.uid,
            parent_id: req.parent,
            target_id: target,
            merchant_id: merchant_user.uid,
            content,
            score: req.score,
            anonymity,
            annex,
        },
    )
    .await?;

    FoodRepository::update_score(&state.pool, review.target_id).await?;

    Ok(result::created(review, "发表成功"))
}

async fn edit_review(
    state: AppState,
    principal: Principal,
    id: i64,
    req: ReviewRequest,
) -> Result<(axum::http::StatusCode, Json<result::ApiResponse<crate::database::models::ReviewEntity>>), AppError> {
    let existing = ReviewRepository::find_by_id(&state.pool, id)
        .await?
        .filter(|r| r.status == ReviewStatus::Active.as_i16())
        .ok_or_else(|| AppError::NotFound("评论不存在".into()))?;

    if existing.author_id != principal.uid {
        return Err(AppError::Forbidden);
    }

    let content = match req.content.as_deref() {
        Some(c) => Some(validate_content(c)?),
        None => None,
    };
    if let Some(score) = req.score {
        validate_score(score)?;
    }
    if let Some(anonymity) = req.anonymity {
        if anonymity != 0 && anonymity != 1 {
            return Err(AppError::InvalidArgument("非法的操作".into()));
        }
    }

    ReviewRepository::update(
        &state.pool,
        id,
        content.as_deref(),
        req.score,
        req.anonymity,
    )
    .await?;

    if req.score.is_some() {
        FoodRepository::update_score(&state.pool, existing.target_id).await?;
    }

    let updated = ReviewRepository::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("评论不存在".into()))?;

    Ok(result::ok_with(updated, "更新成功"))
}

/// 作者删除自己的评论（软删除，状态 3）
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<DeleteReviewQuery>,
) -> Result<impl IntoResponse, AppError> {
    let review = ReviewRepository::find_by_id(&state.pool, query.id)
        .await?
        .filter(|r| r.status == ReviewStatus::Active.as_i16())
        .ok_or_else(|| AppError::NotFound("评论不存在".into()))?;

    if review.author_id != principal.uid {
        return Err(AppError::Forbidden);
    }

    ReviewRepository::set_status(&state.pool, review.id, ReviewStatus::AuthorDeleted.as_i16(), None).await?;
    FoodRepository::update_score(&state.pool, review.target_id).await?;

    Ok(result::ok_with(serde_json::json!({}), "删除成功"))
}
