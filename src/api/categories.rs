//! Category API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_description, validate_name, validate_uuid};

fn validate_create_request(req: &CreateCategoryRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.name, "Category name") {
        errors.add("name", e);
    }
    if let Err(e) = validate_description(&req.description) {
        errors.add("description", e);
    }

    errors.finish()
}

fn validate_update_request(req: &UpdateCategoryRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref name) = req.name {
        if let Err(e) = validate_name(name, "Category name") {
            errors.add("name", e);
        }
    }
    if let Err(e) = validate_description(&req.description) {
        errors.add("description", e);
    }

    errors.finish()
}

/// List all categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(categories))
}

/// Get a single category
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    if let Err(e) = validate_uuid(&id, "category_id") {
        return Err(ApiError::validation_field("category_id", e));
    }

    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;

    Ok(Json(category))
}

/// Create a new category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    validate_create_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO categories (id, name, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("A category with this name already exists")
        } else {
            tracing::error!("Failed to create category: {}", e);
            ApiError::database("Failed to create category")
        }
    })?;

    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    if let Err(e) = validate_uuid(&id, "category_id") {
        return Err(ApiError::validation_field("category_id", e));
    }
    validate_update_request(&req)?;

    let _existing = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;

    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE categories SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("A category with this name already exists")
        } else {
            tracing::error!("Failed to update category: {}", e);
            ApiError::database("Failed to update category")
        }
    })?;

    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(category))
}

/// Delete a category
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "category_id") {
        return Err(ApiError::validation_field("category_id", e));
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("FOREIGN KEY constraint failed") {
                ApiError::conflict("Category is still referenced by ingredients or recipes")
            } else {
                tracing::error!("Failed to delete category: {}", e);
                ApiError::database("Failed to delete category")
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Category not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
