//! HTTP API handlers for recipes-api

pub mod filter;
pub mod health;
pub mod recipes;

pub use filter::filter_recipes;
pub use health::health_routes;
pub use recipes::{create_recipe, delete_recipe, get_recipe, list_recipes, update_recipe};
