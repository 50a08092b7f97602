//! # Recipes Common Library
//!
//! Shared code for the recipe catalog service including:
//! - Schema definitions and database bootstrap
//! - Ingredient resolution (lookup-or-create)
//! - Recipe repository and filter engine
//! - Input validation rules
//! - Configuration loading
//! - Sample data seeding

pub mod config;
pub mod db;
pub mod error;
pub mod validation;

pub use db::{
    FieldUpdate, Ingredient, NewRecipe, Recipe, RecipeFilter, RecipeRepository, RecipeUpdate,
    Schema,
};
pub use error::{Error, Result};
