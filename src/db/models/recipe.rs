//! Recipe models.
//!
//! A recipe owns a list of (ingredient, quantity) lines stored in the
//! `recipe_ingredients` join table; the composite primary key guarantees one
//! line per ingredient.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub servings: i64,
    pub preparation_time: Option<i64>,
    pub difficulty: String,
    pub instructions: String,
    pub operational_cost: f64,
    pub selling_price: f64,
    pub category_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RecipeLine {
    pub ingredient_id: String,
    pub quantity: f64,
}

/// Recipe with its ingredient lines, as returned by detail endpoints
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeLine>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub description: Option<String>,
    pub servings: i64,
    pub preparation_time: Option<i64>,
    pub difficulty: Option<String>,
    pub instructions: String,
    pub operational_cost: Option<f64>,
    pub selling_price: Option<f64>,
    pub category_id: Option<String>,
    pub ingredients: Vec<RecipeLine>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub servings: Option<i64>,
    pub preparation_time: Option<i64>,
    pub difficulty: Option<String>,
    pub instructions: Option<String>,
    pub operational_cost: Option<f64>,
    pub selling_price: Option<f64>,
    pub category_id: Option<String>,
    pub ingredients: Option<Vec<RecipeLine>>,
}

/// Cost summary for a recipe
#[derive(Debug, Serialize)]
pub struct RecipeCostResponse {
    pub recipe_id: String,
    pub ingredient_cost: f64,
    pub operational_cost: f64,
    pub selling_price: f64,
    pub margin: f64,
}
