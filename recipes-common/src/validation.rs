//! Field validation for recipe input
//!
//! Runs before any storage access; failures surface as `Error::InvalidInput`.

use crate::db::models::{FieldUpdate, NewRecipe, RecipeUpdate};
use crate::{Error, Result};

/// Maximum recipe name length (characters)
pub const NAME_MAX_LEN: usize = 100;

/// Maximum instructions length (characters)
pub const INSTRUCTIONS_MAX_LEN: usize = 4000;

/// Maximum ingredient name length (characters)
pub const INGREDIENT_NAME_MAX_LEN: usize = 100;

/// Smallest accepted serving count
pub const SERVINGS_MIN: i64 = 1;

/// Largest accepted serving count
pub const SERVINGS_MAX: i64 = 20;

fn validate_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }

    let len = value.chars().count();
    if len > max_len {
        return Err(Error::InvalidInput(format!(
            "{} must be at most {} characters (got {})",
            field, max_len, len
        )));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<()> {
    validate_text("name", name, NAME_MAX_LEN)
}

pub fn validate_instructions(instructions: &str) -> Result<()> {
    validate_text("instructions", instructions, INSTRUCTIONS_MAX_LEN)
}

pub fn validate_servings(servings: i64) -> Result<()> {
    if !(SERVINGS_MIN..=SERVINGS_MAX).contains(&servings) {
        return Err(Error::InvalidInput(format!(
            "servings must be between {} and {} (got {})",
            SERVINGS_MIN, SERVINGS_MAX, servings
        )));
    }
    Ok(())
}

pub fn validate_ingredient_names(names: &[String]) -> Result<()> {
    names
        .iter()
        .try_for_each(|name| validate_text("ingredient name", name, INGREDIENT_NAME_MAX_LEN))
}

/// Validate every field of a recipe about to be created
pub fn validate_new_recipe(recipe: &NewRecipe) -> Result<()> {
    validate_name(&recipe.name)?;
    validate_instructions(&recipe.instructions)?;
    validate_servings(recipe.servings)?;
    validate_ingredient_names(&recipe.ingredients)
}

/// Validate the present fields of a partial update
///
/// Absent fields are skipped. An explicit null is rejected for every scalar
/// field since none of them is nullable; a null ingredient list is allowed
/// and means "no ingredients".
pub fn validate_update(update: &RecipeUpdate) -> Result<()> {
    match &update.name {
        FieldUpdate::Absent => {}
        FieldUpdate::Clear => return Err(null_field("name")),
        FieldUpdate::Set(name) => validate_name(name)?,
    }

    match &update.instructions {
        FieldUpdate::Absent => {}
        FieldUpdate::Clear => return Err(null_field("instructions")),
        FieldUpdate::Set(instructions) => validate_instructions(instructions)?,
    }

    if update.vegetarian.is_clear() {
        return Err(null_field("vegetarian"));
    }

    match update.servings {
        FieldUpdate::Absent => {}
        FieldUpdate::Clear => return Err(null_field("servings")),
        FieldUpdate::Set(servings) => validate_servings(servings)?,
    }

    if let FieldUpdate::Set(names) = &update.ingredients {
        validate_ingredient_names(names)?;
    }

    Ok(())
}

fn null_field(field: &str) -> Error {
    Error::InvalidInput(format!("{} cannot be null", field))
}
