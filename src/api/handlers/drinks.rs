/*
 * Responsibility
 * - /drinks 系 CRUD handler
 * - 認可は access middleware (permission table) で済んでいる前提
 *   保護された handler は AuthClaims で検証済み claims を受け取る
 * - DTO validation → repo 呼び出し → short/long view へ整形
 */
use axum::{Json, extract::State};

use crate::{
    api::{
        dto::drinks::{
            CreateDrinkRequest, DeleteResponse, DrinkLong, DrinkShort, DrinksResponse,
            UpdateDrinkRequest,
        },
        extractors::{AuthClaims, DrinkId, JsonBody},
    },
    error::AppError,
    state::AppState,
};

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<Vec<DrinkShort>>>, AppError> {
    let rows = state.drinks.list().await?;
    if rows.is_empty() {
        return Err(AppError::not_found("drinks"));
    }

    Ok(Json(DrinksResponse::new(
        rows.iter().map(DrinkShort::from).collect(),
    )))
}

pub async fn list_drinks_detail(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<DrinksResponse<Vec<DrinkLong>>>, AppError> {
    let rows = state.drinks.list().await?;
    if rows.is_empty() {
        return Err(AppError::not_found("drinks"));
    }

    tracing::debug!(sub = claims.subject(), count = rows.len(), "drinks detail");
    Ok(Json(DrinksResponse::new(
        rows.into_iter().map(DrinkLong::from).collect(),
    )))
}

pub async fn create_drink(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    JsonBody(req): JsonBody<CreateDrinkRequest>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    req.validate().map_err(AppError::unprocessable)?;

    let recipe = req.recipe.into_vec();
    let row = state.drinks.create(req.title.trim(), &recipe).await?;

    tracing::info!(sub = claims.subject(), drink_id = row.id, "drink created");
    Ok(Json(DrinksResponse::new(DrinkLong::from(row))))
}

pub async fn update_drink(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    DrinkId(drink_id): DrinkId,
    JsonBody(req): JsonBody<UpdateDrinkRequest>,
) -> Result<Json<DrinksResponse<Vec<DrinkLong>>>, AppError> {
    if req.is_empty() {
        return Err(AppError::bad_request("nothing to update"));
    }
    req.validate().map_err(AppError::unprocessable)?;

    let title = req.title.as_deref().map(str::trim);
    let recipe = req.recipe.map(|r| r.into_vec());

    let row = state
        .drinks
        .update(drink_id, title, recipe.as_deref())
        .await?
        .ok_or(AppError::not_found("drink"))?;

    tracing::info!(sub = claims.subject(), drink_id, "drink updated");
    Ok(Json(DrinksResponse::new(vec![DrinkLong::from(row)])))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    DrinkId(drink_id): DrinkId,
) -> Result<Json<DeleteResponse>, AppError> {
    if drink_id <= 0 {
        return Err(AppError::unprocessable("drink id must be positive"));
    }

    if !state.drinks.delete(drink_id).await? {
        return Err(AppError::not_found("drink"));
    }

    tracing::info!(sub = claims.subject(), drink_id, "drink deleted");
    Ok(Json(DeleteResponse {
        success: true,
        delete: drink_id,
    }))
}
