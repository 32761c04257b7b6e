//! Supplier API endpoints.
//!
//! The canonical supplier schema is the richer one: a typed CPF/CNPJ
//! document plus a payment method, with PIX key details required exactly
//! when the method is `pix`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{CreateSupplierRequest, Supplier, SupplierResponse, UpdateSupplierRequest};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_description, validate_document, validate_document_type, validate_email,
    validate_name, validate_payment_method, validate_phone, validate_pix_fields, validate_uuid,
};

fn validate_create_request(req: &CreateSupplierRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.name, "Supplier name") {
        errors.add("name", e);
    }
    if let Some(ref email) = req.email {
        if !email.is_empty() {
            if let Err(e) = validate_email(email) {
                errors.add("email", e);
            }
        }
    }
    if let Err(e) = validate_phone(&req.phone) {
        errors.add("phone", e);
    }
    if let Err(e) = validate_description(&req.address) {
        errors.add("address", e);
    }

    let document_type = req.document_type.as_deref().unwrap_or("none");
    if let Err(e) = validate_document_type(document_type) {
        errors.add("document_type", e);
    } else if let Err(e) = validate_document(document_type, &req.document) {
        errors.add("document", e);
    }

    let payment_method = req.payment_method.as_deref().unwrap_or("dinheiro");
    if let Err(e) = validate_payment_method(payment_method) {
        errors.add("payment_method", e);
    } else if let Err(e) = validate_pix_fields(payment_method, &req.pix_key, &req.pix_key_type) {
        errors.add("pix_key", e);
    }

    errors.finish()
}

/// Validate an update against the merged state: the payment/document rules
/// must hold for what the row will look like after the update
fn validate_update_request(
    existing: &Supplier,
    req: &UpdateSupplierRequest,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref name) = req.name {
        if let Err(e) = validate_name(name, "Supplier name") {
            errors.add("name", e);
        }
    }
    if let Some(ref email) = req.email {
        if !email.is_empty() {
            if let Err(e) = validate_email(email) {
                errors.add("email", e);
            }
        }
    }
    if let Err(e) = validate_phone(&req.phone) {
        errors.add("phone", e);
    }
    if let Err(e) = validate_description(&req.address) {
        errors.add("address", e);
    }

    let document_type = req
        .document_type
        .as_deref()
        .unwrap_or(&existing.document_type);
    let document = req.document.clone().or_else(|| existing.document.clone());
    if let Err(e) = validate_document_type(document_type) {
        errors.add("document_type", e);
    } else if let Err(e) = validate_document(document_type, &document) {
        errors.add("document", e);
    }

    let payment_method = req
        .payment_method
        .as_deref()
        .unwrap_or(&existing.payment_method);
    let pix_key = req.pix_key.clone().or_else(|| existing.pix_key.clone());
    let pix_key_type = req
        .pix_key_type
        .clone()
        .or_else(|| existing.pix_key_type.clone());
    if let Err(e) = validate_payment_method(payment_method) {
        errors.add("payment_method", e);
    } else if let Err(e) = validate_pix_fields(payment_method, &pix_key, &pix_key_type) {
        errors.add("pix_key", e);
    }

    errors.finish()
}

/// List all suppliers
pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SupplierResponse>>, ApiError> {
    let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(suppliers.into_iter().map(Into::into).collect()))
}

/// Get a single supplier
pub async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SupplierResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "supplier_id") {
        return Err(ApiError::validation_field("supplier_id", e));
    }

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Supplier not found"))?;

    Ok(Json(supplier.into()))
}

/// Create a new supplier
pub async fn create_supplier(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<SupplierResponse>), ApiError> {
    validate_create_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO suppliers (
            id, name, email, phone, address,
            document_type, document, payment_method, pix_key, pix_key_type,
            is_active, created_at, updated_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.address)
    .bind(req.document_type.as_deref().unwrap_or("none"))
    .bind(&req.document)
    .bind(req.payment_method.as_deref().unwrap_or("dinheiro"))
    .bind(&req.pix_key)
    .bind(&req.pix_key_type)
    .bind(req.is_active.unwrap_or(true) as i64)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create supplier: {}", e);
        ApiError::database("Failed to create supplier")
    })?;

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(supplier.into())))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSupplierRequest>,
) -> Result<Json<SupplierResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "supplier_id") {
        return Err(ApiError::validation_field("supplier_id", e));
    }

    let existing = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Supplier not found"))?;

    validate_update_request(&existing, &req)?;

    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE suppliers SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            phone = COALESCE(?, phone),
            address = COALESCE(?, address),
            document_type = COALESCE(?, document_type),
            document = COALESCE(?, document),
            payment_method = COALESCE(?, payment_method),
            pix_key = COALESCE(?, pix_key),
            pix_key_type = COALESCE(?, pix_key_type),
            is_active = COALESCE(?, is_active),
            updated_at = ?
         WHERE id = ?",
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.address)
    .bind(&req.document_type)
    .bind(&req.document)
    .bind(&req.payment_method)
    .bind(&req.pix_key)
    .bind(&req.pix_key_type)
    .bind(req.is_active.map(|b| b as i64))
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update supplier: {}", e);
        ApiError::database("Failed to update supplier")
    })?;

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(supplier.into()))
}

/// Delete a supplier
pub async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "supplier_id") {
        return Err(ApiError::validation_field("supplier_id", e));
    }

    let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("FOREIGN KEY constraint failed") {
                ApiError::conflict("Supplier is still referenced by ingredients")
            } else {
                tracing::error!("Failed to delete supplier: {}", e);
                ApiError::database("Failed to delete supplier")
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Supplier not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
