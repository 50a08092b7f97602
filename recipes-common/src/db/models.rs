//! Database models

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

/// A stored recipe with its ingredients already loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub instructions: String,
    pub vegetarian: bool,
    pub servings: i64,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Ingredient names in association order
    pub fn ingredient_names(&self) -> Vec<&str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }
}

/// Row of the `recipes` table before ingredient hydration
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct RecipeRow {
    pub id: i64,
    pub name: String,
    pub instructions: String,
    pub vegetarian: bool,
    pub servings: i64,
}

impl RecipeRow {
    pub(crate) fn into_recipe(self, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            id: self.id,
            name: self.name,
            instructions: self.instructions,
            vegetarian: self.vegetarian,
            servings: self.servings,
            ingredients,
        }
    }
}

/// Input for creating a recipe; ingredients are given by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub instructions: String,
    pub vegetarian: bool,
    pub servings: i64,
    pub ingredients: Vec<String>,
}

/// One field of a partial update
///
/// Deserializes as `Absent` when the key is missing (requires
/// `#[serde(default)]` on the containing field), `Clear` for an explicit
/// `null`, and `Set` otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    #[default]
    Absent,
    Clear,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldUpdate::Absent)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, FieldUpdate::Clear)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        })
    }
}

/// Partial recipe update; only present fields are applied
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecipeUpdate {
    #[serde(default)]
    pub name: FieldUpdate<String>,
    #[serde(default)]
    pub instructions: FieldUpdate<String>,
    #[serde(default)]
    pub vegetarian: FieldUpdate<bool>,
    #[serde(default)]
    pub servings: FieldUpdate<i64>,
    #[serde(default)]
    pub ingredients: FieldUpdate<Vec<String>>,
}

impl RecipeUpdate {
    /// True when the update names no field at all
    pub fn is_empty(&self) -> bool {
        self.name.is_absent()
            && self.instructions.is_absent()
            && self.vegetarian.is_absent()
            && self.servings.is_absent()
            && self.ingredients.is_absent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_missing_from_null() {
        let update: RecipeUpdate =
            serde_json::from_str(r#"{"servings": 5, "name": null}"#).unwrap();

        assert_eq!(update.servings, FieldUpdate::Set(5));
        assert_eq!(update.name, FieldUpdate::Clear);
        assert!(update.instructions.is_absent());
        assert!(update.vegetarian.is_absent());
        assert!(update.ingredients.is_absent());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_empty_body_is_empty_update() {
        let update: RecipeUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_update_ingredient_list() {
        let update: RecipeUpdate =
            serde_json::from_str(r#"{"ingredients": ["x", "y"]}"#).unwrap();
        assert_eq!(
            update.ingredients.as_set(),
            Some(&vec!["x".to_string(), "y".to_string()])
        );
    }

    #[test]
    fn test_recipe_serializes_nested_ingredients() {
        let recipe = Recipe {
            id: 7,
            name: "Pesto".to_string(),
            instructions: "Blend.".to_string(),
            vegetarian: true,
            servings: 2,
            ingredients: vec![Ingredient {
                id: 3,
                name: "basil".to_string(),
            }],
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["ingredients"][0]["name"], "basil");
        assert_eq!(recipe.ingredient_names(), vec!["basil"]);
    }
}
