//! Ingredient resolution
//!
//! Turns ingredient names into stored `Ingredient` rows, inserting any that
//! do not exist yet. Names match exactly (case-sensitive).
//!
//! Concurrent creators of the same name converge on one row: the insert is
//! `ON CONFLICT(name) DO NOTHING` against the UNIQUE column, and a losing
//! writer re-reads the winner's row. Repository writes call this inside a
//! `BEGIN IMMEDIATE` transaction, which serializes writers outright.

use crate::db::models::Ingredient;
use crate::{Error, Result};
use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::debug;

/// Look up an ingredient by exact name
pub async fn find_ingredient_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<Ingredient>> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        "SELECT id, name FROM ingredients WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(ingredient)
}

async fn get_or_create_ingredient(conn: &mut SqliteConnection, name: &str) -> Result<Ingredient> {
    if let Some(existing) = find_ingredient_by_name(&mut *conn, name).await? {
        return Ok(existing);
    }

    let result = sqlx::query("INSERT INTO ingredients (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 1 {
        let id = result.last_insert_rowid();
        debug!("Created ingredient '{}' (id {})", name, id);
        return Ok(Ingredient {
            id,
            name: name.to_string(),
        });
    }

    // Lost the race: someone inserted the name between lookup and insert
    find_ingredient_by_name(&mut *conn, name)
        .await?
        .ok_or_else(|| {
            Error::Conflict(format!(
                "ingredient '{}' could not be created or found",
                name
            ))
        })
}

/// Resolve names to ingredients, creating missing ones
///
/// Output is order-preserving with one entry per input name. A name repeated
/// within one call is resolved once and reused. Runs on the caller's
/// connection, so inside a transaction the inserts commit or roll back with it.
pub async fn resolve_ingredients(
    conn: &mut SqliteConnection,
    names: &[String],
) -> Result<Vec<Ingredient>> {
    let mut seen: HashMap<&str, Ingredient> = HashMap::new();
    let mut resolved = Vec::with_capacity(names.len());

    for name in names {
        if let Some(ingredient) = seen.get(name.as_str()) {
            resolved.push(ingredient.clone());
            continue;
        }

        let ingredient = get_or_create_ingredient(&mut *conn, name).await?;
        seen.insert(name.as_str(), ingredient.clone());
        resolved.push(ingredient);
    }

    Ok(resolved)
}
