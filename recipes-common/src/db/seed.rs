//! Sample data for a fresh catalog
//!
//! Inserted only when the recipes table is empty, so restarting the service
//! never duplicates or overwrites user data.

use crate::db::models::NewRecipe;
use crate::db::recipes::RecipeRepository;
use crate::Result;
use tracing::info;

struct SampleRecipe {
    name: &'static str,
    vegetarian: bool,
    servings: i64,
    ingredients: &'static [&'static str],
    instructions: &'static str,
}

const SAMPLE_RECIPES: &[SampleRecipe] = &[
    SampleRecipe {
        name: "Vegetable Stir Fry",
        vegetarian: true,
        servings: 4,
        ingredients: &["garlic", "broccoli", "soy sauce", "bell peppers", "carrots", "potatoes"],
        instructions: "Heat oil in a wok. Add vegetables and stir fry for 5-7 minutes. Season with soy sauce and serve hot.",
    },
    SampleRecipe {
        name: "Margherita Pizza",
        vegetarian: true,
        servings: 2,
        ingredients: &["fresh basil", "mozzarella cheese", "pizza dough", "tomato sauce", "olive oil"],
        instructions: "Roll out pizza dough. Spread tomato sauce, add mozzarella and fresh basil. Bake in oven at 220°C for 15 minutes.",
    },
    SampleRecipe {
        name: "Mushroom Risotto",
        vegetarian: true,
        servings: 4,
        ingredients: &["mushrooms", "butter", "white wine", "vegetable stock", "arborio rice", "parmesan cheese", "potatoes"],
        instructions: "Sauté mushrooms in butter. Add arborio rice and gradually add vegetable stock while stirring. Bake in oven at 220°C for 15 minutes..",
    },
    SampleRecipe {
        name: "Grilled Chicken Breast",
        vegetarian: false,
        servings: 2,
        ingredients: &["chicken breast", "garlic", "rosemary", "olive oil", "thyme"],
        instructions: "Marinate chicken with herbs and olive oil. Grill on medium heat for 6-8 minutes per side until cooked through.",
    },
    SampleRecipe {
        name: "Salmon with Lemon",
        vegetarian: false,
        servings: 4,
        ingredients: &["garlic", "lemon", "salmon fillets", "olive oil", "dill"],
        instructions: "Season salmon fillets with salt and pepper. Bake in oven at 180°C for 20 minutes. Serve with lemon wedges.",
    },
    SampleRecipe {
        name: "Beef Tacos",
        vegetarian: false,
        servings: 6,
        ingredients: &["taco seasoning", "sour cream", "tortillas", "ground beef", "lettuce", "salsa", "cheese"],
        instructions: "Brown ground beef with taco seasoning. Fill tortillas with beef, lettuce, cheese, and salsa. Serve immediately.",
    },
    SampleRecipe {
        name: "Pasta Carbonara",
        vegetarian: false,
        servings: 4,
        ingredients: &["bacon", "eggs", "garlic", "spaghetti", "black pepper", "parmesan cheese"],
        instructions: "Cook spaghetti. Mix eggs with parmesan cheese. Fry bacon until crispy. Combine pasta with bacon and egg mixture.",
    },
];

/// The built-in sample set as creatable recipes
pub fn sample_recipes() -> Vec<NewRecipe> {
    SAMPLE_RECIPES
        .iter()
        .map(|sample| NewRecipe {
            name: sample.name.to_string(),
            instructions: sample.instructions.to_string(),
            vegetarian: sample.vegetarian,
            servings: sample.servings,
            ingredients: sample.ingredients.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

/// Insert the sample set if the catalog is empty
///
/// Returns the number of recipes inserted (0 when data already exists).
pub async fn seed_if_empty(repo: &RecipeRepository) -> Result<usize> {
    let existing = repo.count().await?;
    if existing > 0 {
        info!("Catalog has {} recipe(s), skipping sample data", existing);
        return Ok(0);
    }

    let samples = sample_recipes();
    for sample in &samples {
        repo.create(sample).await?;
    }

    info!("Seeded {} sample recipes", samples.len());
    Ok(samples.len())
}
