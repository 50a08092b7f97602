//! Recipe filter endpoint
//!
//! GET /recipes/filter/?vegetarian=&servings=&include_ingredients=&exclude_ingredients=&instruction_search=
//!
//! Ingredient names and the instruction search are lowercased here before the
//! filter engine sees them. Repeated `include_ingredients` / `exclude_ingredients`
//! keys collect into lists.

use std::collections::BTreeSet;

use axum::{extract::State, Json};
use axum_extra::extract::{Query, QueryRejection};
use recipes_common::{Recipe, RecipeFilter};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const FILTER_SERVINGS_MAX: i64 = 20;
pub const INSTRUCTION_SEARCH_MAX_LEN: usize = 200;

/// Raw query parameters as sent by the client
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub vegetarian: Option<bool>,
    pub servings: Option<i64>,
    #[serde(default)]
    pub include_ingredients: Vec<String>,
    #[serde(default)]
    pub exclude_ingredients: Vec<String>,
    pub instruction_search: Option<String>,
}

impl FilterParams {
    /// Validate and normalize into a filter the engine can run
    pub fn into_filter(self) -> ApiResult<RecipeFilter> {
        if let Some(servings) = self.servings {
            if !(0..=FILTER_SERVINGS_MAX).contains(&servings) {
                return Err(ApiError::BadRequest(format!(
                    "servings must be between 0 and {} (got {})",
                    FILTER_SERVINGS_MAX, servings
                )));
            }
        }

        let instruction_search = match self.instruction_search {
            Some(text) => {
                let len = text.chars().count();
                if len == 0 || len > INSTRUCTION_SEARCH_MAX_LEN {
                    return Err(ApiError::BadRequest(format!(
                        "instruction_search must be 1 to {} characters (got {})",
                        INSTRUCTION_SEARCH_MAX_LEN, len
                    )));
                }
                Some(text.to_lowercase())
            }
            None => None,
        };

        let include_ingredients = normalize_names("include_ingredients", self.include_ingredients)?;
        let exclude_ingredients = normalize_names("exclude_ingredients", self.exclude_ingredients)?;

        let filter = RecipeFilter {
            vegetarian: self.vegetarian,
            servings: self.servings,
            include_ingredients,
            exclude_ingredients,
            instruction_search,
        };

        if filter.is_empty() {
            return Err(ApiError::BadRequest(
                "At least one filter parameter must be provided.".to_string(),
            ));
        }

        let excluded: BTreeSet<&str> = filter.exclude_ingredients.iter().map(String::as_str).collect();
        let overlap: BTreeSet<&str> = filter
            .include_ingredients
            .iter()
            .map(String::as_str)
            .filter(|name| excluded.contains(name))
            .collect();
        if !overlap.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Ingredients cannot be both included and excluded: {:?}",
                overlap.into_iter().collect::<Vec<_>>()
            )));
        }

        Ok(filter)
    }
}

/// Lowercase names and drop duplicates, keeping first-seen order
fn normalize_names(field: &str, names: Vec<String>) -> ApiResult<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut normalized = Vec::with_capacity(names.len());

    for name in names {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "{} must not contain blank names",
                field
            )));
        }
        if seen.insert(name.clone()) {
            normalized.push(name);
        }
    }

    Ok(normalized)
}

/// GET /recipes/filter/
pub async fn filter_recipes(
    State(state): State<AppState>,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let Query(params) = query?;
    let filter = params.into_filter()?;

    debug!(?filter, "Filtering recipes");
    let recipes = state.repo.filter(&filter).await?;
    Ok(Json(recipes))
}
