//! Database models and queries

pub mod filter;
pub mod ingredients;
pub mod init;
pub mod models;
pub mod recipes;
pub mod schema;
pub mod seed;

pub use filter::RecipeFilter;
pub use ingredients::{find_ingredient_by_name, resolve_ingredients};
pub use init::{connect_in_memory, init_database};
pub use models::{FieldUpdate, Ingredient, NewRecipe, Recipe, RecipeUpdate};
pub use recipes::RecipeRepository;
pub use schema::{ColumnDefinition, Schema, TableDefinition};
pub use seed::{sample_recipes, seed_if_empty};
