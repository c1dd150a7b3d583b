use axum::{
    extract::{Query, State},
    response::IntoResponse,
};

use crate::AppState;
use crate::auth::FoodStatus;
use crate::database::models::UserSummary;
use crate::database::operations::{FoodRepository, ReviewRepository, UserRepository};
use crate::error::AppError;
use crate::result;
use crate::routes::{Paged, Pagination};

use super::model::{
    FoodDetailQuery, FoodDetailResponse, ReviewTreeQuery, SearchQuery, build_review_tree,
};

/// 首页随机推荐
pub async fn index(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let (page, limit, offset) = pagination.normalize()?;
    let (list, total) = FoodRepository::list_random(&state.pool, limit, offset).await?;

    Ok(result::ok(Paged {
        list,
        total,
        current: page,
        size: limit,
    }))
}

/// 评分排行榜
pub async fn rank(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let list = FoodRepository::rank(&state.pool).await?;
    Ok(result::ok(list))
}

pub async fn search_merchant(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, limit, offset) = query.pagination().normalize()?;
    let (list, total) =
        UserRepository::search_merchants(&state.pool, query.keyword.trim(), limit, offset).await?;

    Ok(result::ok(Paged {
        list,
        total,
        current: page,
        size: limit,
    }))
}

pub async fn search_food(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (page, limit, offset) = query.pagination().normalize()?;
    let (list, total) =
        FoodRepository::search(&state.pool, query.keyword.trim(), limit, offset).await?;

    Ok(result::ok(Paged {
        list,
        total,
        current: page,
        size: limit,
    }))
}

/// 美食详情，带商家名片
pub async fn food_detail(
    State(state): State<AppState>,
    Query(query): Query<FoodDetailQuery>,
) -> Result<impl IntoResponse, AppError> {
    let food = FoodRepository::find_by_id(&state.pool, query.id)
        .await?
        .filter(|f| f.status == FoodStatus::Listed.as_i16())
        .ok_or_else(|| AppError::NotFound("美食不存在".into()))?;

    let merchant = UserRepository::find_by_uid(&state.pool, food.merchant)
        .await?
        .map(|u| UserSummary {
            uid: u.uid,
            username: u.username,
            nickname: u.nickname,
            avatar: u.avatar,
            intro: u.intro,
        });

    Ok(result::ok(FoodDetailResponse { food, merchant }))
}

/// 美食评论树
pub async fn food_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewTreeQuery>,
) -> Result<impl IntoResponse, AppError> {
    FoodRepository::find_listed_by_id(&state.pool, query.id)
        .await?
        .ok_or_else(|| AppError::NotFound("美食不存在".into()))?;

    let rows = ReviewRepository::list_active_by_food(&state.pool, query.id).await?;
    Ok(result::ok(build_review_tree(&rows)))
}
