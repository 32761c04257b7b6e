//! Supplier models.
//!
//! Suppliers carry Brazilian commerce fields: an optional CPF/CNPJ document
//! and a payment method, with PIX key details when the method is `pix`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub document_type: String,
    pub document: Option<String>,
    pub payment_method: String,
    pub pix_key: Option<String>,
    pub pix_key_type: Option<String>,
    pub is_active: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierResponse {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub document_type: String,
    pub document: Option<String>,
    pub payment_method: String,
    pub pix_key: Option<String>,
    pub pix_key_type: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Supplier> for SupplierResponse {
    fn from(s: Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name,
            email: s.email,
            phone: s.phone,
            address: s.address,
            document_type: s.document_type,
            document: s.document,
            payment_method: s.payment_method,
            pix_key: s.pix_key,
            pix_key_type: s.pix_key_type,
            is_active: s.is_active != 0,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub document_type: Option<String>,
    pub document: Option<String>,
    pub payment_method: Option<String>,
    pub pix_key: Option<String>,
    pub pix_key_type: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub document_type: Option<String>,
    pub document: Option<String>,
    pub payment_method: Option<String>,
    pub pix_key: Option<String>,
    pub pix_key_type: Option<String>,
    pub is_active: Option<bool>,
}
