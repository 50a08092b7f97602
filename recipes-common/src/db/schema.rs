//! Table Schema Definitions
//!
//! Single source of truth for the catalog tables. A `Schema` value is built
//! explicitly and handed to `RecipeRepository::open`, which creates any
//! missing tables; nothing is registered globally.
//!
//! # Usage
//!
//! ```rust,ignore
//! let schema = Schema::recipe_catalog();
//! let repo = RecipeRepository::open(pool, schema).await?;
//! ```

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// UNIQUE constraint
    pub unique: bool,
    /// DEFAULT value
    pub default_value: Option<String>,
    /// REFERENCES target, e.g. `recipes(id)`
    pub references: Option<String>,
    /// ON DELETE CASCADE on the foreign key
    pub cascade_delete: bool,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            unique: false,
            default_value: None,
            references: None,
            cascade_delete: false,
        }
    }

    /// Mark column as PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark column as UNIQUE
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set DEFAULT value
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Foreign key to `target`, deleted along with the referenced row
    pub fn references_cascade(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self.cascade_delete = true;
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if let Some(target) = &self.references {
            sql.push_str(&format!(" REFERENCES {}", target));
            if self.cascade_delete {
                sql.push_str(" ON DELETE CASCADE");
            }
        }
        sql
    }
}

/// One table: columns in creation order plus table-level constraints
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub constraints: Vec<String>,
    /// `(index_name, column_list)` pairs created alongside the table
    pub indexes: Vec<(String, String)>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            name: name.into(),
            columns,
            constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Add a table-level constraint such as a composite primary key
    pub fn constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn index(mut self, name: impl Into<String>, columns: impl Into<String>) -> Self {
        self.indexes.push((name.into(), columns.into()));
        self
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table
    pub fn create_sql(&self) -> String {
        let body: Vec<String> = self
            .columns
            .iter()
            .map(ColumnDefinition::to_sql)
            .chain(self.constraints.iter().cloned())
            .collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            body.join(",\n    ")
        )
    }

    fn index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|(index, columns)| {
                format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {}({})",
                    index, self.name, columns
                )
            })
            .collect()
    }
}

/// The set of tables a repository works against
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    /// Recipes, ingredients, and their many-to-many association
    pub fn recipe_catalog() -> Self {
        let recipes = TableDefinition::new(
            "recipes",
            vec![
                ColumnDefinition::new("id", "INTEGER").primary_key(),
                ColumnDefinition::new("name", "TEXT").not_null(),
                ColumnDefinition::new("instructions", "TEXT").not_null(),
                ColumnDefinition::new("vegetarian", "INTEGER")
                    .not_null()
                    .default("0"),
                ColumnDefinition::new("servings", "INTEGER").not_null(),
            ],
        );

        // Names compare with the default BINARY collation: "Garlic" != "garlic"
        let ingredients = TableDefinition::new(
            "ingredients",
            vec![
                ColumnDefinition::new("id", "INTEGER").primary_key(),
                ColumnDefinition::new("name", "TEXT").not_null().unique(),
            ],
        );

        let recipe_ingredient = TableDefinition::new(
            "recipe_ingredient",
            vec![
                ColumnDefinition::new("recipe_id", "INTEGER")
                    .not_null()
                    .references_cascade("recipes(id)"),
                ColumnDefinition::new("ingredient_id", "INTEGER")
                    .not_null()
                    .references_cascade("ingredients(id)"),
            ],
        )
        .constraint("PRIMARY KEY (recipe_id, ingredient_id)")
        .index("idx_recipe_ingredient_ingredient", "ingredient_id");

        Self {
            tables: vec![recipes, ingredients, recipe_ingredient],
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Create every missing table and index (idempotent)
    pub async fn create_all(&self, pool: &SqlitePool) -> Result<()> {
        for table in &self.tables {
            sqlx::query(&table.create_sql()).execute(pool).await?;
            for index_sql in table.index_sql() {
                sqlx::query(&index_sql).execute(pool).await?;
            }
        }

        info!("Schema ready: {}", self.table_names().join(", "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::connect_in_memory;

    #[test]
    fn test_catalog_tables_defined() {
        let schema = Schema::recipe_catalog();
        assert_eq!(
            schema.table_names(),
            vec!["recipes", "ingredients", "recipe_ingredient"]
        );

        let ingredients = schema.table("ingredients").unwrap();
        assert!(ingredients
            .columns
            .iter()
            .any(|c| c.name == "name" && c.not_null && c.unique));
    }

    #[test]
    fn test_association_sql_has_composite_key_and_cascade() {
        let schema = Schema::recipe_catalog();
        let sql = schema.table("recipe_ingredient").unwrap().create_sql();

        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS recipe_ingredient"));
        assert!(sql.contains("PRIMARY KEY (recipe_id, ingredient_id)"));
        assert!(sql.contains("recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE"));
    }

    #[test]
    fn test_column_sql_rendering() {
        let column = ColumnDefinition::new("vegetarian", "INTEGER")
            .not_null()
            .default("0");
        assert_eq!(column.to_sql(), "vegetarian INTEGER NOT NULL DEFAULT 0");
    }

    #[tokio::test]
    async fn test_create_all_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        let schema = Schema::recipe_catalog();

        schema.create_all(&pool).await.unwrap();
        schema.create_all(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('recipes', 'ingredients', 'recipe_ingredient')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 3);
    }
}
