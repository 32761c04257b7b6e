//! Ingredient (stock item) models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    pub stock: f64,
    pub min_stock: f64,
    pub expiration_date: Option<String>,
    pub category_id: String,
    pub supplier_id: Option<String>,
    pub is_active: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Ingredient {
    /// Parsed expiration date. Stored as `YYYY-MM-DD`; validation rejects
    /// anything else on write, so a malformed value reads as "no expiry".
    pub fn expiration(&self) -> Option<NaiveDate> {
        self.expiration_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientResponse {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    pub stock: f64,
    pub min_stock: f64,
    pub expiration_date: Option<String>,
    pub category_id: String,
    pub supplier_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            unit: i.unit,
            unit_cost: i.unit_cost,
            stock: i.stock,
            min_stock: i.min_stock,
            expiration_date: i.expiration_date,
            category_id: i.category_id,
            supplier_id: i.supplier_id,
            is_active: i.is_active != 0,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub unit: String,
    pub unit_cost: f64,
    pub stock: Option<f64>,
    pub min_stock: Option<f64>,
    pub expiration_date: Option<String>,
    pub category_id: String,
    pub supplier_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub unit_cost: Option<f64>,
    pub stock: Option<f64>,
    pub min_stock: Option<f64>,
    pub expiration_date: Option<String>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Body of `PATCH /ingredients/:id/stock`
#[derive(Debug, Deserialize)]
pub struct UpdateStockRequest {
    pub quantity: f64,
    pub operation: String,
}
