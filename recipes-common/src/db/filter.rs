//! Recipe filter engine
//!
//! Builds one query from any combination of predicates. Evaluation order:
//!
//! 1. Exclusion: recipes having ANY excluded ingredient, looked up in the
//!    full association table, are removed from the candidates
//! 2. Vegetarian equality
//! 3. Servings equality
//! 4. Inclusion: recipe has AT LEAST ONE of the named ingredients
//! 5. Case-insensitive substring match on instructions
//!
//! Ingredient names are compared exactly; callers normalize case first.
//! An empty filter matches every recipe.

use crate::db::models::RecipeRow;
use crate::Result;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

/// Optional predicates; an empty vector means "no predicate"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub vegetarian: Option<bool>,
    pub servings: Option<i64>,
    pub include_ingredients: Vec<String>,
    pub exclude_ingredients: Vec<String>,
    pub instruction_search: Option<String>,
}

impl RecipeFilter {
    /// True when no predicate is set
    pub fn is_empty(&self) -> bool {
        self.vegetarian.is_none()
            && self.servings.is_none()
            && self.include_ingredients.is_empty()
            && self.exclude_ingredients.is_empty()
            && self.instruction_search.is_none()
    }
}

/// Append `AND r.id NOT IN (<recipes linked to any of names>)`
///
/// The subquery reads the unfiltered association data, so a recipe is
/// dropped if ANY of its ingredients is excluded. Binds one parameter per
/// name, never one per recipe.
fn push_exclusion(builder: &mut QueryBuilder<'_, Sqlite>, names: &[String]) {
    if names.is_empty() {
        return;
    }

    builder.push(
        " AND r.id NOT IN (SELECT ri.recipe_id FROM recipe_ingredient ri \
         JOIN ingredients i ON i.id = ri.ingredient_id \
         WHERE i.name IN (",
    );
    let mut separated = builder.separated(", ");
    for name in names {
        separated.push_bind(name.clone());
    }
    separated.push_unseparated("))");
}

/// Escape LIKE wildcards so the needle matches literally (ESCAPE '\')
pub(crate) fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Run the filter and return matching recipe rows in id order
///
/// One statement; the exclusion is evaluated as a subquery inside it.
pub(crate) async fn filter_recipe_rows(
    conn: &mut SqliteConnection,
    filter: &RecipeFilter,
) -> Result<Vec<RecipeRow>> {
    debug!("Filtering recipes: {:?}", filter);

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT r.id, r.name, r.instructions, r.vegetarian, r.servings \
         FROM recipes r WHERE 1 = 1",
    );

    push_exclusion(&mut builder, &filter.exclude_ingredients);

    if let Some(vegetarian) = filter.vegetarian {
        builder.push(" AND r.vegetarian = ").push_bind(vegetarian);
    }

    if let Some(servings) = filter.servings {
        builder.push(" AND r.servings = ").push_bind(servings);
    }

    if !filter.include_ingredients.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM recipe_ingredient ri \
             JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE ri.recipe_id = r.id AND i.name IN (",
        );
        let mut names = builder.separated(", ");
        for name in &filter.include_ingredients {
            names.push_bind(name.clone());
        }
        names.push_unseparated("))");
    }

    if let Some(search) = &filter.instruction_search {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        builder
            .push(" AND lower(r.instructions) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'");
    }

    builder.push(" ORDER BY r.id");

    let rows = builder
        .build_query_as::<RecipeRow>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows)
}
