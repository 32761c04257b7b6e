//! Input validation for API requests.
//!
//! Field validators return `Result<(), String>`; handlers collect failures
//! into an `ApiError` through the `ValidationErrorBuilder` from the `error`
//! module. Document, phone and PIX formats follow Brazilian conventions.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Regex for validating Brazilian phone numbers, e.g. (11) 99999-9999
    static ref PHONE_REGEX: Regex = Regex::new(r"^\(\d{2}\)\s\d{4,5}-\d{4}$").unwrap();

    /// Regex for validating formatted CPF, e.g. 123.456.789-09
    static ref CPF_REGEX: Regex = Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").unwrap();

    /// Regex for validating formatted CNPJ, e.g. 12.345.678/0001-90
    static ref CNPJ_REGEX: Regex = Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").unwrap();
}

/// Valid supplier document types
pub const VALID_DOCUMENT_TYPES: [&str; 3] = ["cpf", "cnpj", "none"];

/// Valid supplier payment methods
pub const VALID_PAYMENT_METHODS: [&str; 5] =
    ["dinheiro", "cartao", "pix", "transferencia", "boleto"];

/// Valid PIX key types
pub const VALID_PIX_KEY_TYPES: [&str; 5] = ["cpf", "cnpj", "email", "telefone", "aleatoria"];

/// Valid recipe difficulties
pub const VALID_DIFFICULTIES: [&str; 3] = ["EASY", "MEDIUM", "HARD"];

/// Valid stock adjustment operations
pub const VALID_STOCK_OPERATIONS: [&str; 2] = ["add", "subtract"];

/// Valid user roles
pub const VALID_ROLES: [&str; 2] = ["user", "admin"];

fn one_of(value: &str, allowed: &[&str], what: &str) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!("Invalid {}. Must be one of: {}", what, allowed.join(", ")))
    }
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a display name (user, category, supplier, ingredient, recipe)
pub fn validate_name(name: &str, what: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{} is required", what));
    }

    if name.len() > 100 {
        return Err(format!("{} is too long (max 100 characters)", what));
    }

    Ok(())
}

/// Validate an optional description
pub fn validate_description(description: &Option<String>) -> Result<(), String> {
    if let Some(d) = description {
        if d.len() > 500 {
            return Err("Description is too long (max 500 characters)".to_string());
        }
    }

    Ok(())
}

/// Validate a Brazilian phone number (optional field)
pub fn validate_phone(phone: &Option<String>) -> Result<(), String> {
    if let Some(p) = phone {
        if p.is_empty() {
            return Ok(()); // Empty string treated as no phone
        }

        if !PHONE_REGEX.is_match(p) {
            return Err("Invalid phone format. Use (11) 99999-9999".to_string());
        }
    }

    Ok(())
}

/// Validate a supplier document type
pub fn validate_document_type(document_type: &str) -> Result<(), String> {
    one_of(document_type, &VALID_DOCUMENT_TYPES, "document type")
}

/// Validate a CPF/CNPJ document against its declared type.
/// With document type `none` any document value is ignored.
pub fn validate_document(document_type: &str, document: &Option<String>) -> Result<(), String> {
    match document_type {
        "cpf" => match document.as_deref() {
            Some(d) if CPF_REGEX.is_match(d) => Ok(()),
            Some(_) => Err("Invalid CPF format. Use 123.456.789-09".to_string()),
            None => Err("Document is required for document type cpf".to_string()),
        },
        "cnpj" => match document.as_deref() {
            Some(d) if CNPJ_REGEX.is_match(d) => Ok(()),
            Some(_) => Err("Invalid CNPJ format. Use 12.345.678/0001-90".to_string()),
            None => Err("Document is required for document type cnpj".to_string()),
        },
        _ => Ok(()),
    }
}

/// Validate a supplier payment method
pub fn validate_payment_method(payment_method: &str) -> Result<(), String> {
    one_of(payment_method, &VALID_PAYMENT_METHODS, "payment method")
}

/// Validate PIX key fields against the payment method: both key and key type
/// are required together exactly when the method is `pix`
pub fn validate_pix_fields(
    payment_method: &str,
    pix_key: &Option<String>,
    pix_key_type: &Option<String>,
) -> Result<(), String> {
    if payment_method != "pix" {
        return Ok(());
    }

    match (pix_key.as_deref(), pix_key_type.as_deref()) {
        (Some(key), Some(key_type)) => {
            if key.trim().is_empty() {
                return Err("PIX key is required for payment method pix".to_string());
            }
            one_of(key_type, &VALID_PIX_KEY_TYPES, "PIX key type")
        }
        _ => Err("PIX key and key type are required for payment method pix".to_string()),
    }
}

/// Validate a recipe difficulty
pub fn validate_difficulty(difficulty: &str) -> Result<(), String> {
    one_of(difficulty, &VALID_DIFFICULTIES, "difficulty")
}

/// Validate a stock adjustment operation
pub fn validate_stock_operation(operation: &str) -> Result<(), String> {
    one_of(operation, &VALID_STOCK_OPERATIONS, "stock operation")
}

/// Validate a user role
pub fn validate_role(role: &str) -> Result<(), String> {
    one_of(role, &VALID_ROLES, "role")
}

/// Validate a measurement unit (kg, g, l, dozen, ...)
pub fn validate_unit(unit: &str) -> Result<(), String> {
    if unit.trim().is_empty() {
        return Err("Unit is required".to_string());
    }

    if unit.len() > 20 {
        return Err("Unit is too long (max 20 characters)".to_string());
    }

    Ok(())
}

/// Validate a non-negative money or quantity value
pub fn validate_non_negative(value: f64, field: &str) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} must be a number", field));
    }

    if value < 0.0 {
        return Err(format!("{} must not be negative", field));
    }

    Ok(())
}

/// Validate an optional `YYYY-MM-DD` date
pub fn validate_date(date: &Option<String>) -> Result<(), String> {
    if let Some(d) = date {
        if d.is_empty() {
            return Ok(()); // Empty string treated as no date
        }

        if NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err() {
            return Err("Invalid date. Use YYYY-MM-DD".to_string());
        }
    }

    Ok(())
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("maria@padoca.com.br").is_ok());
        assert!(validate_email("a@b.co").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Farinha de trigo", "Name").is_ok());
        assert!(validate_name("", "Name").is_err());
        assert!(validate_name("   ", "Name").is_err());
        assert!(validate_name(&"x".repeat(101), "Name").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone(&Some("(11) 99999-9999".to_string())).is_ok());
        assert!(validate_phone(&Some("(11) 9999-9999".to_string())).is_ok());
        assert!(validate_phone(&Some("".to_string())).is_ok());
        assert!(validate_phone(&None).is_ok());

        assert!(validate_phone(&Some("11999999999".to_string())).is_err());
        assert!(validate_phone(&Some("(11)99999-9999".to_string())).is_err());
    }

    #[test]
    fn test_validate_document() {
        assert!(validate_document("cpf", &Some("123.456.789-09".to_string())).is_ok());
        assert!(validate_document("cnpj", &Some("12.345.678/0001-90".to_string())).is_ok());
        assert!(validate_document("none", &None).is_ok());

        assert!(validate_document("cpf", &None).is_err());
        assert!(validate_document("cpf", &Some("12345678909".to_string())).is_err());
        assert!(validate_document("cnpj", &Some("123.456.789-09".to_string())).is_err());
    }

    #[test]
    fn test_validate_payment_method() {
        for method in VALID_PAYMENT_METHODS {
            assert!(validate_payment_method(method).is_ok());
        }
        assert!(validate_payment_method("cheque").is_err());
    }

    #[test]
    fn test_validate_pix_fields() {
        // Only required when the method is pix
        assert!(validate_pix_fields("dinheiro", &None, &None).is_ok());

        assert!(validate_pix_fields(
            "pix",
            &Some("maria@padoca.com.br".to_string()),
            &Some("email".to_string())
        )
        .is_ok());

        assert!(validate_pix_fields("pix", &None, &None).is_err());
        assert!(validate_pix_fields("pix", &Some("key".to_string()), &None).is_err());
        assert!(validate_pix_fields(
            "pix",
            &Some("key".to_string()),
            &Some("carrier-pigeon".to_string())
        )
        .is_err());
    }

    #[test]
    fn test_validate_difficulty() {
        assert!(validate_difficulty("EASY").is_ok());
        assert!(validate_difficulty("MEDIUM").is_ok());
        assert!(validate_difficulty("HARD").is_ok());
        assert!(validate_difficulty("easy").is_err());
    }

    #[test]
    fn test_validate_stock_operation() {
        assert!(validate_stock_operation("add").is_ok());
        assert!(validate_stock_operation("subtract").is_ok());
        assert!(validate_stock_operation("set").is_err());
    }

    #[test]
    fn test_validate_role() {
        assert!(validate_role("user").is_ok());
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("baker").is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(0.0, "unit_cost").is_ok());
        assert!(validate_non_negative(4.5, "unit_cost").is_ok());

        assert!(validate_non_negative(-0.01, "unit_cost").is_err());
        assert!(validate_non_negative(f64::NAN, "unit_cost").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date(&Some("2025-06-15".to_string())).is_ok());
        assert!(validate_date(&Some("".to_string())).is_ok());
        assert!(validate_date(&None).is_ok());

        assert!(validate_date(&Some("15/06/2025".to_string())).is_err());
        assert!(validate_date(&Some("2025-13-01".to_string())).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "category_id").is_ok());
        assert!(validate_uuid("", "category_id").is_err());
        assert!(validate_uuid("not-a-uuid", "category_id").is_err());
    }
}
