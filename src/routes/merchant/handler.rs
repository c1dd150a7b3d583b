use axum::{
    extract::{Extension, Json, Query, State},
    response::IntoResponse,
};

use crate::AppState;
use crate::auth::{MerchantStatus, Principal, sign_token};
use crate::database::operations::{
    CategoryRepository, FoodRepository, FoodUpdate, ProfileUpdate, ReviewRepository,
    UserRepository,
};
use crate::error::AppError;
use crate::result;
use crate::routes::Paged;
use crate::routes::user::model::AuthResponse;
use crate::utils;
use crate::verification::{self, MerchantApplication};

use super::model::{
    AddCategoryRequest, AddFoodRequest, ApplyRequest, CategoryListQuery, DeleteCategoryQuery,
    DeleteFoodQuery, EditCategoryRequest, EditFoodRequest, FoodListQuery, RegisterRequest,
    ReviewListQuery, StatisticResponse, UpdateInfoRequest,
};

/// 商家注册账号
///
/// 新账号处于“未申请”态，需再提交入驻申请进入审核。
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
    let user = UserRepository::create_merchant(&state.pool, &req.username, &hashed).await?;
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

/// 提交入驻申请，进入审核流水线
pub async fn apply(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ApplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !utils::is_nickname_valid(&req.nickname) {
        return Err(AppError::InvalidArgument("非法的店铺名称".into()));
    }
    if !utils::is_phone_valid(&req.phone) {
        return Err(AppError::InvalidArgument("非法的手机号".into()));
    }
    if !utils::is_email_valid(&req.email) {
        return Err(AppError::InvalidArgument("非法的邮箱".into()));
    }
    if req.address.trim().is_empty() {
        return Err(AppError::InvalidArgument("地址不能为空".into()));
    }
    if !req.annex.starts_with(&state.config.cdn_prefix) {
        return Err(AppError::InvalidArgument("非法的附件".into()));
    }
    let avatar = req.avatar.unwrap_or_else(|| utils::DEFAULT_AVATAR.to_string());
    if !avatar.starts_with(&state.config.cdn_prefix) && avatar != utils::DEFAULT_AVATAR {
        return Err(AppError::InvalidArgument("非法的头像地址".into()));
    }

    let subject = UserRepository::find_by_uid(&state.pool, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    let record = verification::submit_merchant_application(
        &state.pool,
        &state.mailer,
        &subject,
        MerchantApplication {
            nickname: req.nickname.trim().to_string(),
            avatar,
            phone: req.phone,
            email: req.email,
            address: req.address.trim().to_string(),
            annex: req.annex,
        },
    )
    .await?;

    Ok(result::created(record, "申请提交成功"))
}

/// 商家自己的资料
pub async fn get_info(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::find_by_uid(&state.pool, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    Ok(result::ok(user))
}

/// 商家资料更新，须已通过审核
pub async fn update_info(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateInfoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = UserRepository::find_by_uid(&state.pool, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    if MerchantStatus::from_i16(user.status) != Some(MerchantStatus::Active) {
        return Err(AppError::Forbidden);
    }

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
    if let Some(address) = &req.address {
        update.address = Some(address.trim().to_string());
    }
    // 店铺展示字段对商家即时生效
    if let Some(nickname) = &req.nickname {
        if !utils::is_nickname_valid(nickname) {
            return Err(AppError::InvalidArgument("非法的店铺名称".into()));
        }
        update.nickname = Some(nickname.trim().to_string());
    }
    if let Some(avatar) = &req.avatar {
        if !avatar.starts_with(&state.config.cdn_prefix) {
            return Err(AppError::InvalidArgument("非法的头像地址".into()));
        }
        update.avatar = Some(avatar.clone());
    }
    if let Some(intro) = &req.intro {
        if intro.chars().count() > 100 {
            return Err(AppError::InvalidArgument("简介长度不能超过100".into()));
        }
        update.intro = Some(intro.trim().to_string());
    }

    UserRepository::update_profile(&state.pool, principal.uid, &update).await?;

    let user = UserRepository::find_by_uid(&state.pool, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

    Ok(result::ok(user))
}

/// 工作台统计数
pub async fn statistic(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, AppError> {
    let (food, category, review) =
        FoodRepository::merchant_statistic(&state.pool, principal.uid).await?;

    Ok(result::ok(StatisticResponse {
        food,
        category,
        review,
    }))
}

/// 商家美食列表
pub async fn list_food(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<FoodListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, limit, offset) = query.pagination().normalize()?;
    let (list, total) = FoodRepository::list_by_merchant(
        &state.pool,
        principal.uid,
        query.name.as_deref(),
        query.category,
        query.status,
        limit,
        offset,
    )
    .await?;

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

/// 新增美食
pub async fn add_food(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<AddFoodRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("美食名称不能为空".into()));
    }
    if req.price < 0.0 {
        return Err(AppError::InvalidArgument("非法的价格".into()));
    }
    let status = req.status.unwrap_or(1);
    if status != 0 && status != 1 {
        return Err(AppError::InvalidArgument("非法的状态".into()));
    }
    if FoodRepository::find_by_merchant_and_name(&state.pool, principal.uid, name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("美食已存在".into()));
    }
    if let Some(category) = req.category {
        CategoryRepository::find_by_id(&state.pool, category, principal.uid)
            .await?
            .ok_or_else(|| AppError::NotFound("分类不存在".into()))?;
    }

    let food = FoodRepository::insert(
        &state.pool,
        principal.uid,
        name,
        req.intro.as_deref().unwrap_or(""),
        req.cover.as_deref().unwrap_or(utils::DEFAULT_COVER),
        req.category,
        req.price,
        status,
    )
    .await?;

    Ok(result::created(food, "添加成功"))
}

/// 编辑美食
pub async fn edit_food(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<EditFoodRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(status) = req.status {
        if status != 0 && status != 1 {
            return Err(AppError::InvalidArgument("非法的状态".into()));
        }
    }
    if let Some(price) = req.price {
        if price < 0.0 {
            return Err(AppError::InvalidArgument("非法的价格".into()));
        }
    }
    if let Some(category) = req.category {
        CategoryRepository::find_by_id(&state.pool, category, principal.uid)
            .await?
            .ok_or_else(|| AppError::NotFound("分类不存在".into()))?;
    }

    let category = if req.clear_category.unwrap_or(false) {
        Some(None)
    } else {
        req.category.map(Some)
    };

    let update = FoodUpdate {
        name: req.name.map(|n| n.trim().to_string()),
        intro: req.intro,
        cover: req.cover,
        category,
        price: req.price,
        status: req.status,
    };

    if !FoodRepository::update(&state.pool, req.id, principal.uid, &update).await? {
        return Err(AppError::NotFound("美食不存在".into()));
    }

    let food = FoodRepository::find_by_id(&state.pool, req.id)
        .await?
        .ok_or_else(|| AppError::NotFound("美食不存在".into()))?;

    Ok(result::ok_with(food, "更新成功"))
}

/// 删除美食
pub async fn delete_food(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<DeleteFoodQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !FoodRepository::delete(&state.pool, query.id, principal.uid).await? {
        return Err(AppError::NotFound("美食不存在".into()));
    }

    Ok(result::ok_with(serde_json::json!({}), "删除成功"))
}

/// 分类列表（带美食数）
pub async fn list_category(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<CategoryListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, limit, offset) = query.pagination().normalize()?;
    let (list, total) = CategoryRepository::list_with_count(
        &state.pool,
        principal.uid,
        query.name.as_deref(),
        limit,
        offset,
    )
    .await?;

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

/// 新增分类
pub async fn add_category(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<AddCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = req.category.trim();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("分类名不能为空".into()));
    }
    if CategoryRepository::find_by_merchant_and_name(&state.pool, principal.uid, name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("分类已存在".into()));
    }

    let category = CategoryRepository::insert(&state.pool, principal.uid, name).await?;
    Ok(result::created(category, "添加成功"))
}

/// 重命名分类
pub async fn edit_category(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<EditCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = req.category.trim();
    if name.is_empty() {
        return Err(AppError::InvalidArgument("分类名不能为空".into()));
    }

    CategoryRepository::find_by_id(&state.pool, req.id, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("分类不存在".into()))?;

    if let Some(existing) =
        CategoryRepository::find_by_merchant_and_name(&state.pool, principal.uid, name).await?
    {
        if existing.id != req.id {
            return Err(AppError::Conflict("分类已存在".into()));
        }
    }

    CategoryRepository::rename(&state.pool, req.id, name).await?;

    let category = CategoryRepository::find_by_id(&state.pool, req.id, principal.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("分类不存在".into()))?;

    Ok(result::ok_with(category, "更新成功"))
}

/// 删除分类并解除美食关联
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<DeleteCategoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !CategoryRepository::delete_and_detach_foods(&state.pool, query.id, principal.uid).await? {
        return Err(AppError::NotFound("分类不存在".into()));
    }

    Ok(result::ok_with(serde_json::json!({}), "删除成功"))
}

/// 商家收到的评论
pub async fn list_reviews(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, limit, offset) = query.pagination().normalize()?;
    let (list, total) = ReviewRepository::list_by_merchant(
        &state.pool,
        principal.uid,
        query.food,
        limit,
        offset,
    )
    .await?;

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
