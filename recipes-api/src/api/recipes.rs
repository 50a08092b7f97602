//! Recipe CRUD endpoints
//!
//! POST   /recipes/      create
//! GET    /recipes/      list (optional skip/limit)
//! GET    /recipes/:id   fetch one
//! PUT    /recipes/:id   partial update
//! DELETE /recipes/:id   delete

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use axum_extra::extract::{Query, QueryRejection};
use recipes_common::{NewRecipe, Recipe, RecipeUpdate};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Optional paging for the list endpoint; defaults return everything
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Recipe ids are positive; anything else is rejected before the lookup
fn recipe_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    let Path(id) = path?;
    if id <= 0 {
        return Err(ApiError::BadRequest(format!(
            "Recipe id must be greater than 0 (got {})",
            id
        )));
    }
    Ok(id)
}

/// POST /recipes/
pub async fn create_recipe(
    State(state): State<AppState>,
    payload: Result<Json<NewRecipe>, JsonRejection>,
) -> ApiResult<Json<Recipe>> {
    let Json(new_recipe) = payload?;
    let recipe = state.repo.create(&new_recipe).await?;
    Ok(Json(recipe))
}

/// GET /recipes/:id
pub async fn get_recipe(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Recipe>> {
    let id = recipe_id(path)?;
    state
        .repo
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::recipe_not_found)
}

/// GET /recipes/
pub async fn list_recipes(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let Query(query) = query?;
    if query.skip < 0 || query.limit.is_some_and(|limit| limit < 0) {
        return Err(ApiError::BadRequest(
            "skip and limit must not be negative".to_string(),
        ));
    }

    let recipes = state.repo.list(query.skip, query.limit).await?;
    Ok(Json(recipes))
}

/// PUT /recipes/:id
///
/// Only fields present in the body change; `null` is rejected for scalar
/// fields and empties the ingredient list.
pub async fn update_recipe(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RecipeUpdate>, JsonRejection>,
) -> ApiResult<Json<Recipe>> {
    let id = recipe_id(path)?;
    let Json(update) = payload?;

    state
        .repo
        .update(id, &update)
        .await?
        .map(Json)
        .ok_or_else(ApiError::recipe_not_found)
}

/// DELETE /recipes/:id
pub async fn delete_recipe(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = recipe_id(path)?;
    if !state.repo.delete(id).await? {
        return Err(ApiError::recipe_not_found());
    }
    Ok(Json(DeleteResponse { ok: true }))
}
