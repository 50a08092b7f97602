//! Recipe repository
//!
//! Owns the pool; opening it creates the tables of the given schema. Every
//! operation runs on a single pooled connection or transaction that is released when it drops,
//! and every returned `Recipe` has its ingredients loaded.

use crate::db::filter::{filter_recipe_rows, RecipeFilter};
use crate::db::ingredients::resolve_ingredients;
use crate::db::models::{FieldUpdate, Ingredient, NewRecipe, Recipe, RecipeRow, RecipeUpdate};
use crate::db::schema::Schema;
use crate::validation::{validate_new_recipe, validate_update};
use crate::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Writes take the write lock at BEGIN, so a read inside the transaction
/// never has to upgrade a stale WAL snapshot (SQLITE_BUSY, no busy wait).
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Recipe ids per ingredient-loading query (stays under SQLite's bind limit)
const HYDRATE_CHUNK: usize = 500;

#[derive(Debug, Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    /// Create any missing tables from `schema` and wrap the pool
    pub async fn open(pool: SqlitePool, schema: Schema) -> Result<Self> {
        schema.create_all(&pool).await?;
        Ok(Self { pool })
    }

    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with(BEGIN_WRITE).await?)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Validate, resolve ingredients, and insert a recipe in one transaction
    pub async fn create(&self, new_recipe: &NewRecipe) -> Result<Recipe> {
        validate_new_recipe(new_recipe)?;

        let mut tx = self.begin_write().await?;

        let ingredients = resolve_ingredients(&mut *tx, &new_recipe.ingredients).await?;

        let id = sqlx::query(
            "INSERT INTO recipes (name, instructions, vegetarian, servings) VALUES (?, ?, ?, ?)",
        )
        .bind(&new_recipe.name)
        .bind(&new_recipe.instructions)
        .bind(new_recipe.vegetarian)
        .bind(new_recipe.servings)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let ingredients = link_ingredients(&mut *tx, id, ingredients).await?;

        tx.commit().await?;

        info!(
            "Created recipe {} '{}' with {} ingredient(s)",
            id,
            new_recipe.name,
            ingredients.len()
        );

        Ok(Recipe {
            id,
            name: new_recipe.name.clone(),
            instructions: new_recipe.instructions.clone(),
            vegetarian: new_recipe.vegetarian,
            servings: new_recipe.servings,
            ingredients,
        })
    }

    /// Fetch by id; `None` when no such recipe exists
    pub async fn get(&self, id: i64) -> Result<Option<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        fetch_recipe(&mut conn, id).await
    }

    /// Recipes in storage order, skipping `skip`, at most `limit` (all when `None`)
    pub async fn list(&self, skip: i64, limit: Option<i64>) -> Result<Vec<Recipe>> {
        let mut conn = self.pool.acquire().await?;

        // SQLite treats a negative LIMIT as "no limit"
        let rows = sqlx::query_as::<_, RecipeRow>(
            "SELECT id, name, instructions, vegetarian, servings FROM recipes \
             ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit.map(|l| l.max(0)).unwrap_or(-1))
        .bind(skip.max(0))
        .fetch_all(&mut *conn)
        .await?;

        hydrate(&mut conn, rows).await
    }

    /// Apply the present fields of `update`; `None` when no such recipe exists
    ///
    /// A present ingredient list replaces every existing link. All changes
    /// commit together or not at all.
    pub async fn update(&self, id: i64, update: &RecipeUpdate) -> Result<Option<Recipe>> {
        validate_update(update)?;

        let mut tx = self.begin_write().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Ok(None);
        }

        update_scalar_fields(&mut tx, id, update).await?;

        match &update.ingredients {
            FieldUpdate::Absent => {}
            FieldUpdate::Clear => {
                unlink_all(&mut tx, id).await?;
            }
            FieldUpdate::Set(names) => {
                let ingredients = resolve_ingredients(&mut *tx, names).await?;
                unlink_all(&mut tx, id).await?;
                link_ingredients(&mut *tx, id, ingredients).await?;
            }
        }

        let recipe = fetch_recipe(&mut tx, id).await?;

        tx.commit().await?;

        info!("Updated recipe {}", id);
        Ok(recipe)
    }

    /// Remove a recipe and its ingredient links (ingredients stay)
    ///
    /// Returns `false` when no such recipe exists.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.begin_write().await?;

        unlink_all(&mut tx, id).await?;

        let deleted = sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Ok(false);
        }

        tx.commit().await?;

        info!("Deleted recipe {}", id);
        Ok(true)
    }

    /// Number of stored recipes
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Run the filter engine; exclusion set and main query share one snapshot
    pub async fn filter(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let mut tx = self.pool.begin().await?;

        let rows = filter_recipe_rows(&mut tx, filter).await?;
        let recipes = hydrate(&mut tx, rows).await?;

        tx.commit().await?;
        Ok(recipes)
    }
}

async fn fetch_recipe(conn: &mut SqliteConnection, id: i64) -> Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, RecipeRow>(
        "SELECT id, name, instructions, vegetarian, servings FROM recipes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(hydrate(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn update_scalar_fields(
    conn: &mut SqliteConnection,
    id: i64,
    update: &RecipeUpdate,
) -> Result<()> {
    let changes_scalars = update.name.as_set().is_some()
        || update.instructions.as_set().is_some()
        || update.vegetarian.as_set().is_some()
        || update.servings.as_set().is_some();
    if !changes_scalars {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE recipes SET ");
    let mut assignments = builder.separated(", ");

    if let Some(name) = update.name.as_set() {
        assignments.push("name = ").push_bind_unseparated(name.clone());
    }
    if let Some(instructions) = update.instructions.as_set() {
        assignments
            .push("instructions = ")
            .push_bind_unseparated(instructions.clone());
    }
    if let Some(vegetarian) = update.vegetarian.as_set() {
        assignments
            .push("vegetarian = ")
            .push_bind_unseparated(*vegetarian);
    }
    if let Some(servings) = update.servings.as_set() {
        assignments.push("servings = ").push_bind_unseparated(*servings);
    }

    builder.push(" WHERE id = ").push_bind(id);
    builder.build().execute(&mut *conn).await?;

    Ok(())
}

/// Link ingredients to a recipe, dropping repeated entities
///
/// Returns the distinct ingredients in first-seen order.
async fn link_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    ingredients: Vec<Ingredient>,
) -> Result<Vec<Ingredient>> {
    let mut seen = HashSet::new();
    let distinct: Vec<Ingredient> = ingredients
        .into_iter()
        .filter(|i| seen.insert(i.id))
        .collect();

    for ingredient in &distinct {
        sqlx::query(
            "INSERT OR IGNORE INTO recipe_ingredient (recipe_id, ingredient_id) VALUES (?, ?)",
        )
        .bind(recipe_id)
        .bind(ingredient.id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(distinct)
}

async fn unlink_all(conn: &mut SqliteConnection, recipe_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM recipe_ingredient WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Load ingredients for many recipes, keyed by recipe id, in link order
async fn load_ingredients(
    conn: &mut SqliteConnection,
    recipe_ids: &[i64],
) -> Result<HashMap<i64, Vec<Ingredient>>> {
    let mut by_recipe: HashMap<i64, Vec<Ingredient>> = HashMap::new();

    for chunk in recipe_ids.chunks(HYDRATE_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT ri.recipe_id, i.id, i.name FROM recipe_ingredient ri \
             JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE ri.recipe_id IN (",
        );
        let mut ids = builder.separated(", ");
        for id in chunk {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY ri.rowid");

        let rows = builder
            .build_query_as::<(i64, i64, String)>()
            .fetch_all(&mut *conn)
            .await?;

        for (recipe_id, id, name) in rows {
            by_recipe
                .entry(recipe_id)
                .or_default()
                .push(Ingredient { id, name });
        }
    }

    Ok(by_recipe)
}

/// Attach ingredients to bare recipe rows, keeping row order
pub(crate) async fn hydrate(
    conn: &mut SqliteConnection,
    rows: Vec<RecipeRow>,
) -> Result<Vec<Recipe>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut ingredients = load_ingredients(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let linked = ingredients.remove(&row.id).unwrap_or_default();
            row.into_recipe(linked)
        })
        .collect())
}
