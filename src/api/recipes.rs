//! Recipe API endpoints.
//!
//! Drafts are validated by the `costing` module against the ingredient ids
//! that currently exist, before anything is written. Recipe and ingredient
//! lines are written in one transaction so a failed line insert never leaves
//! a half-created recipe behind.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::costing::{self, RecipeDraft};
use crate::db::{
    CreateRecipeRequest, Recipe, RecipeCostResponse, RecipeLine, RecipeResponse,
    UpdateRecipeRequest,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_difficulty, validate_non_negative, validate_uuid};

#[derive(Debug, Deserialize)]
pub struct ListRecipesQuery {
    pub category_id: Option<String>,
}

/// Field checks not covered by the costing draft validation
fn validate_aux_fields(
    difficulty: Option<&str>,
    preparation_time: Option<i64>,
    operational_cost: Option<f64>,
    selling_price: Option<f64>,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(d) = difficulty {
        if let Err(e) = validate_difficulty(d) {
            errors.add("difficulty", e);
        }
    }
    if let Some(t) = preparation_time {
        if t < 0 {
            errors.add("preparation_time", "Preparation time must not be negative");
        }
    }
    if let Some(c) = operational_cost {
        if let Err(e) = validate_non_negative(c, "operational_cost") {
            errors.add("operational_cost", e);
        }
    }
    if let Some(p) = selling_price {
        if let Err(e) = validate_non_negative(p, "selling_price") {
            errors.add("selling_price", e);
        }
    }

    errors.finish()
}

async fn fetch_lines(state: &AppState, recipe_id: &str) -> Result<Vec<RecipeLine>, ApiError> {
    let lines = sqlx::query_as::<_, RecipeLine>(
        "SELECT ingredient_id, quantity FROM recipe_ingredients WHERE recipe_id = ?",
    )
    .bind(recipe_id)
    .fetch_all(&state.db)
    .await?;

    Ok(lines)
}

async fn known_ingredient_ids(state: &AppState) -> Result<HashSet<String>, ApiError> {
    let ids: Vec<(String,)> = sqlx::query_as("SELECT id FROM ingredients")
        .fetch_all(&state.db)
        .await?;

    Ok(ids.into_iter().map(|(id,)| id).collect())
}

async fn ensure_category_exists(state: &AppState, category_id: &str) -> Result<(), ApiError> {
    let found: Option<(String,)> = sqlx::query_as("SELECT id FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(&state.db)
        .await?;

    if found.is_none() {
        return Err(ApiError::not_found("Category not found"));
    }
    Ok(())
}

/// List recipes, optionally filtered by category
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListRecipesQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = match &query.category_id {
        Some(category_id) => {
            if let Err(e) = validate_uuid(category_id, "category_id") {
                return Err(ApiError::validation_field("category_id", e));
            }
            sqlx::query_as::<_, Recipe>(
                "SELECT * FROM recipes WHERE category_id = ? ORDER BY name",
            )
            .bind(category_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Recipe>("SELECT * FROM recipes ORDER BY name")
                .fetch_all(&state.db)
                .await?
        }
    };

    Ok(Json(recipes))
}

/// Get a recipe with its ingredient lines
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecipeResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "recipe_id") {
        return Err(ApiError::validation_field("recipe_id", e));
    }

    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    let ingredients = fetch_lines(&state, &id).await?;

    Ok(Json(RecipeResponse {
        recipe,
        ingredients,
    }))
}

/// Create a new recipe with its ingredient lines
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    validate_aux_fields(
        req.difficulty.as_deref(),
        req.preparation_time,
        req.operational_cost,
        req.selling_price,
    )?;
    if let Some(ref category_id) = req.category_id {
        if let Err(e) = validate_uuid(category_id, "category_id") {
            return Err(ApiError::validation_field("category_id", e));
        }
        ensure_category_exists(&state, category_id).await?;
    }

    let known = known_ingredient_ids(&state).await?;
    let draft = RecipeDraft {
        name: &req.name,
        servings: req.servings,
        instructions: &req.instructions,
        lines: &req.ingredients,
    };
    costing::validate_draft(&draft, &known)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let mut tx = state.db.begin().await?;

    sqlx::query(
        "INSERT INTO recipes (
            id, name, description, servings, preparation_time, difficulty,
            instructions, operational_cost, selling_price, category_id,
            created_at, updated_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.servings)
    .bind(req.preparation_time)
    .bind(req.difficulty.as_deref().unwrap_or("EASY"))
    .bind(&req.instructions)
    .bind(req.operational_cost.unwrap_or(0.0))
    .bind(req.selling_price.unwrap_or(0.0))
    .bind(&req.category_id)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    for line in &req.ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity)
             VALUES (?, ?, ?)",
        )
        .bind(&id)
        .bind(&line.ingredient_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;
    let ingredients = fetch_lines(&state, &id).await?;

    Ok((
        StatusCode::CREATED,
        Json(RecipeResponse {
            recipe,
            ingredients,
        }),
    ))
}

/// Update a recipe. The merged result of existing row and patch must still
/// be a valid draft; a provided ingredient list replaces the old one.
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "recipe_id") {
        return Err(ApiError::validation_field("recipe_id", e));
    }
    validate_aux_fields(
        req.difficulty.as_deref(),
        req.preparation_time,
        req.operational_cost,
        req.selling_price,
    )?;

    let existing = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    if let Some(ref category_id) = req.category_id {
        if let Err(e) = validate_uuid(category_id, "category_id") {
            return Err(ApiError::validation_field("category_id", e));
        }
        ensure_category_exists(&state, category_id).await?;
    }

    let existing_lines = fetch_lines(&state, &id).await?;
    let merged_lines = req.ingredients.as_ref().unwrap_or(&existing_lines);

    let known = known_ingredient_ids(&state).await?;
    let draft = RecipeDraft {
        name: req.name.as_deref().unwrap_or(&existing.name),
        servings: req.servings.unwrap_or(existing.servings),
        instructions: req.instructions.as_deref().unwrap_or(&existing.instructions),
        lines: merged_lines,
    };
    costing::validate_draft(&draft, &known)?;

    let now = chrono::Utc::now().to_rfc3339();

    let mut tx = state.db.begin().await?;

    sqlx::query(
        "UPDATE recipes SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            servings = COALESCE(?, servings),
            preparation_time = COALESCE(?, preparation_time),
            difficulty = COALESCE(?, difficulty),
            instructions = COALESCE(?, instructions),
            operational_cost = COALESCE(?, operational_cost),
            selling_price = COALESCE(?, selling_price),
            category_id = COALESCE(?, category_id),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.servings)
    .bind(req.preparation_time)
    .bind(&req.difficulty)
    .bind(&req.instructions)
    .bind(req.operational_cost)
    .bind(req.selling_price)
    .bind(&req.category_id)
    .bind(&now)
    .bind(&id)
    .execute(&mut *tx)
    .await?;

    if let Some(ref lines) = req.ingredients {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity)
                 VALUES (?, ?, ?)",
            )
            .bind(&id)
            .bind(&line.ingredient_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;
    let ingredients = fetch_lines(&state, &id).await?;

    Ok(Json(RecipeResponse {
        recipe,
        ingredients,
    }))
}

/// Delete a recipe (its ingredient lines cascade)
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "recipe_id") {
        return Err(ApiError::validation_field("recipe_id", e));
    }

    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Recipe not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Cost summary: raw ingredient cost plus the caller-tracked operational
/// cost and selling price, with the resulting margin
pub async fn recipe_cost(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecipeCostResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "recipe_id") {
        return Err(ApiError::validation_field("recipe_id", e));
    }

    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    let lines = fetch_lines(&state, &id).await?;

    let costs: Vec<(String, f64)> = sqlx::query_as("SELECT id, unit_cost FROM ingredients")
        .fetch_all(&state.db)
        .await?;
    let unit_costs: HashMap<String, f64> = costs.into_iter().collect();

    let ingredient_cost = costing::ingredient_cost(&lines, &unit_costs)?;
    let margin = costing::margin(recipe.selling_price, recipe.operational_cost);

    Ok(Json(RecipeCostResponse {
        recipe_id: recipe.id,
        ingredient_cost,
        operational_cost: recipe.operational_cost,
        selling_price: recipe.selling_price,
        margin,
    }))
}
