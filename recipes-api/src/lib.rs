//! recipes-api library - HTTP boundary for the recipe catalog
//!
//! Routes requests to the recipe repository and filter engine in
//! `recipes-common`, validating and normalizing input on the way in.

use axum::{extract::DefaultBodyLimit, Router};
use recipes_common::RecipeRepository;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Request bodies larger than this are rejected with 413
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub repo: RecipeRepository,
}

impl AppState {
    pub fn new(repo: RecipeRepository) -> Self {
        Self { repo }
    }
}

/// Build application router
///
/// `/recipes/filter/` is a static segment, so it takes precedence over the
/// `/recipes/:id` capture.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let recipes = Router::new()
        .route(
            "/recipes/",
            get(api::list_recipes).post(api::create_recipe),
        )
        .route("/recipes/filter/", get(api::filter_recipes))
        .route(
            "/recipes/:id",
            get(api::get_recipe)
                .put(api::update_recipe)
                .delete(api::delete_recipe),
        );

    Router::new()
        .merge(recipes)
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
