//! Ingredient (stock) API endpoints.
//!
//! Besides plain CRUD this exposes the inventory views the dashboard needs:
//! a low-stock filter, a stock adjustment operation, aggregate statistics
//! and the low-stock/expiring-soon alert feed. All derived figures come
//! from the `stock` module over the snapshot fetched per request.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    Category, CreateIngredientRequest, Ingredient, IngredientResponse, Supplier,
    UpdateIngredientRequest, UpdateStockRequest,
};
use crate::stock::{self, InventoryStats, StockStatus, EXPIRY_HORIZON_DAYS};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_date, validate_name, validate_non_negative, validate_stock_operation, validate_unit,
    validate_uuid,
};

#[derive(Debug, Deserialize)]
pub struct ListIngredientsQuery {
    pub category_id: Option<String>,
    pub low_stock: Option<bool>,
}

/// Alert counters for the dashboard
#[derive(Debug, Serialize)]
pub struct AlertCounts {
    pub low_stock_count: usize,
    pub expiring_soon_count: usize,
}

/// Low-stock and expiring-soon feeds
#[derive(Debug, Serialize)]
pub struct StockAlertsResponse {
    pub low_stock: Vec<IngredientResponse>,
    pub expiring_soon: Vec<IngredientResponse>,
    pub alerts: AlertCounts,
}

fn validate_create_request(req: &CreateIngredientRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.name, "Ingredient name") {
        errors.add("name", e);
    }
    if let Err(e) = validate_unit(&req.unit) {
        errors.add("unit", e);
    }
    if let Err(e) = validate_non_negative(req.unit_cost, "unit_cost") {
        errors.add("unit_cost", e);
    }
    if let Err(e) = validate_non_negative(req.stock.unwrap_or(0.0), "stock") {
        errors.add("stock", e);
    }
    if let Err(e) = validate_non_negative(req.min_stock.unwrap_or(0.0), "min_stock") {
        errors.add("min_stock", e);
    }
    if let Err(e) = validate_date(&req.expiration_date) {
        errors.add("expiration_date", e);
    }
    if let Err(e) = validate_uuid(&req.category_id, "category_id") {
        errors.add("category_id", e);
    }
    if let Some(ref supplier_id) = req.supplier_id {
        if let Err(e) = validate_uuid(supplier_id, "supplier_id") {
            errors.add("supplier_id", e);
        }
    }

    errors.finish()
}

fn validate_update_request(req: &UpdateIngredientRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref name) = req.name {
        if let Err(e) = validate_name(name, "Ingredient name") {
            errors.add("name", e);
        }
    }
    if let Some(ref unit) = req.unit {
        if let Err(e) = validate_unit(unit) {
            errors.add("unit", e);
        }
    }
    if let Some(unit_cost) = req.unit_cost {
        if let Err(e) = validate_non_negative(unit_cost, "unit_cost") {
            errors.add("unit_cost", e);
        }
    }
    if let Some(s) = req.stock {
        if let Err(e) = validate_non_negative(s, "stock") {
            errors.add("stock", e);
        }
    }
    if let Some(m) = req.min_stock {
        if let Err(e) = validate_non_negative(m, "min_stock") {
            errors.add("min_stock", e);
        }
    }
    if let Err(e) = validate_date(&req.expiration_date) {
        errors.add("expiration_date", e);
    }
    if let Some(ref category_id) = req.category_id {
        if let Err(e) = validate_uuid(category_id, "category_id") {
            errors.add("category_id", e);
        }
    }
    if let Some(ref supplier_id) = req.supplier_id {
        if let Err(e) = validate_uuid(supplier_id, "supplier_id") {
            errors.add("supplier_id", e);
        }
    }

    errors.finish()
}

async fn ensure_category_exists(state: &AppState, category_id: &str) -> Result<(), ApiError> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(&state.db)
        .await?;

    if category.is_none() {
        return Err(ApiError::not_found("Category not found"));
    }
    Ok(())
}

async fn ensure_supplier_exists(state: &AppState, supplier_id: &str) -> Result<(), ApiError> {
    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(supplier_id)
        .fetch_optional(&state.db)
        .await?;

    if supplier.is_none() {
        return Err(ApiError::not_found("Supplier not found"));
    }
    Ok(())
}

/// List ingredients, optionally filtered by category and/or low stock
pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListIngredientsQuery>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let ingredients = match &query.category_id {
        Some(category_id) => {
            if let Err(e) = validate_uuid(category_id, "category_id") {
                return Err(ApiError::validation_field("category_id", e));
            }
            sqlx::query_as::<_, Ingredient>(
                "SELECT * FROM ingredients WHERE category_id = ? ORDER BY name",
            )
            .bind(category_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients ORDER BY name")
                .fetch_all(&state.db)
                .await?
        }
    };

    let ingredients: Vec<Ingredient> = if query.low_stock.unwrap_or(false) {
        ingredients
            .into_iter()
            .filter(|i| stock::stock_status(i) == StockStatus::Low)
            .collect()
    } else {
        ingredients
    };

    Ok(Json(ingredients.into_iter().map(Into::into).collect()))
}

/// Get a single ingredient
pub async fn get_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<IngredientResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "ingredient_id") {
        return Err(ApiError::validation_field("ingredient_id", e));
    }

    let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Ingredient not found"))?;

    Ok(Json(ingredient.into()))
}

/// Create a new ingredient
pub async fn create_ingredient(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>), ApiError> {
    validate_create_request(&req)?;

    ensure_category_exists(&state, &req.category_id).await?;
    if let Some(ref supplier_id) = req.supplier_id {
        ensure_supplier_exists(&state, supplier_id).await?;
    }

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO ingredients (
            id, name, unit, unit_cost, stock, min_stock, expiration_date,
            category_id, supplier_id, is_active, created_at, updated_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&req.unit)
    .bind(req.unit_cost)
    .bind(req.stock.unwrap_or(0.0))
    .bind(req.min_stock.unwrap_or(0.0))
    .bind(&req.expiration_date)
    .bind(&req.category_id)
    .bind(&req.supplier_id)
    .bind(req.is_active.unwrap_or(true) as i64)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create ingredient: {}", e);
        ApiError::database("Failed to create ingredient")
    })?;

    let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

/// Update an ingredient
pub async fn update_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateIngredientRequest>,
) -> Result<Json<IngredientResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "ingredient_id") {
        return Err(ApiError::validation_field("ingredient_id", e));
    }
    validate_update_request(&req)?;

    let _existing = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Ingredient not found"))?;

    if let Some(ref category_id) = req.category_id {
        ensure_category_exists(&state, category_id).await?;
    }
    if let Some(ref supplier_id) = req.supplier_id {
        ensure_supplier_exists(&state, supplier_id).await?;
    }

    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE ingredients SET
            name = COALESCE(?, name),
            unit = COALESCE(?, unit),
            unit_cost = COALESCE(?, unit_cost),
            stock = COALESCE(?, stock),
            min_stock = COALESCE(?, min_stock),
            expiration_date = COALESCE(?, expiration_date),
            category_id = COALESCE(?, category_id),
            supplier_id = COALESCE(?, supplier_id),
            is_active = COALESCE(?, is_active),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&req.name)
    .bind(&req.unit)
    .bind(req.unit_cost)
    .bind(req.stock)
    .bind(req.min_stock)
    .bind(&req.expiration_date)
    .bind(&req.category_id)
    .bind(&req.supplier_id)
    .bind(req.is_active.map(|b| b as i64))
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update ingredient: {}", e);
        ApiError::database("Failed to update ingredient")
    })?;

    let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ingredient.into()))
}

/// Delete an ingredient
pub async fn delete_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "ingredient_id") {
        return Err(ApiError::validation_field("ingredient_id", e));
    }

    let result = sqlx::query("DELETE FROM ingredients WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("FOREIGN KEY constraint failed") {
                ApiError::conflict("Ingredient is still used by recipes")
            } else {
                tracing::error!("Failed to delete ingredient: {}", e);
                ApiError::database("Failed to delete ingredient")
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Ingredient not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Adjust stock by a quantity: `{"quantity": 2.5, "operation": "add"}`.
/// Subtracting below zero is rejected, keeping stock non-negative.
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<IngredientResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "ingredient_id") {
        return Err(ApiError::validation_field("ingredient_id", e));
    }
    if let Err(e) = validate_stock_operation(&req.operation) {
        return Err(ApiError::validation_field("operation", e));
    }
    if !req.quantity.is_finite() || req.quantity <= 0.0 {
        return Err(ApiError::validation_field(
            "quantity",
            "Quantity must be greater than zero",
        ));
    }

    let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Ingredient not found"))?;

    let new_stock = match req.operation.as_str() {
        "add" => ingredient.stock + req.quantity,
        _ => ingredient.stock - req.quantity,
    };
    if new_stock < 0.0 {
        return Err(ApiError::validation_field(
            "quantity",
            format!(
                "Cannot subtract {} {}: only {} in stock",
                req.quantity, ingredient.unit, ingredient.stock
            ),
        ));
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("UPDATE ingredients SET stock = ?, updated_at = ? WHERE id = ?")
        .bind(new_stock)
        .bind(&now)
        .bind(&id)
        .execute(&state.db)
        .await?;

    let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ingredient.into()))
}

/// Aggregate inventory statistics
pub async fn ingredient_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InventoryStats>, ApiError> {
    let ingredients = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(InventoryStats::collect(&ingredients)))
}

/// Low-stock and expiring-soon alert feeds
pub async fn stock_alerts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StockAlertsResponse>, ApiError> {
    let ingredients = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients")
        .fetch_all(&state.db)
        .await?;

    let today = chrono::Utc::now().date_naive();

    let low_stock: Vec<IngredientResponse> = ingredients
        .iter()
        .filter(|i| stock::stock_status(i) == StockStatus::Low)
        .cloned()
        .map(Into::into)
        .collect();

    let expiring_soon: Vec<IngredientResponse> = ingredients
        .iter()
        .filter(|i| stock::is_expiring_soon(i, today, EXPIRY_HORIZON_DAYS))
        .cloned()
        .map(Into::into)
        .collect();

    let alerts = AlertCounts {
        low_stock_count: low_stock.len(),
        expiring_soon_count: expiring_soon.len(),
    };

    Ok(Json(StockAlertsResponse {
        low_stock,
        expiring_soon,
        alerts,
    }))
}
