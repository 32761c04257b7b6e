//! Inventory valuation.
//!
//! Pure, read-only derivations over ingredient snapshots: stock status
//! against the configured minimum, stock value, expiration flags and
//! aggregate statistics. Nothing here touches the database; callers pass
//! whatever snapshot they fetched and the same row always yields the same
//! answer.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::db::Ingredient;

/// Window for the "expiring soon" warning, in days
pub const EXPIRY_HORIZON_DAYS: i64 = 30;

/// Stock level relative to the configured minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Low,
    Medium,
    Good,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Low => "low",
            StockStatus::Medium => "medium",
            StockStatus::Good => "good",
        }
    }
}

/// Stock tier of an ingredient. At exactly `min_stock` the status is low;
/// at exactly `min_stock * 1.5` it is medium.
pub fn stock_status(ingredient: &Ingredient) -> StockStatus {
    if ingredient.stock <= ingredient.min_stock {
        StockStatus::Low
    } else if ingredient.stock <= ingredient.min_stock * 1.5 {
        StockStatus::Medium
    } else {
        StockStatus::Good
    }
}

/// Monetary value of the stock on hand
pub fn total_value(ingredient: &Ingredient) -> f64 {
    ingredient.unit_cost * ingredient.stock
}

/// Whole days from `as_of` until `date` (negative when past)
fn days_until(date: NaiveDate, as_of: NaiveDate) -> i64 {
    (date - as_of).num_days()
}

/// An ingredient is expired iff its expiration date is strictly before
/// `as_of`. No expiration date means never expired.
pub fn is_expired(ingredient: &Ingredient, as_of: NaiveDate) -> bool {
    match ingredient.expiration() {
        Some(date) => date < as_of,
        None => false,
    }
}

/// An ingredient is expiring soon iff its expiration date lies strictly
/// after `as_of` and within `horizon_days`. An item due exactly on `as_of`
/// is neither expired nor expiring soon, so the two predicates never both
/// hold for the same snapshot.
pub fn is_expiring_soon(ingredient: &Ingredient, as_of: NaiveDate, horizon_days: i64) -> bool {
    match ingredient.expiration() {
        Some(date) => {
            let days = days_until(date, as_of);
            days > 0 && days <= horizon_days
        }
        None => false,
    }
}

/// Aggregate statistics over an ingredient collection
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total_ingredients: usize,
    pub low_stock_count: usize,
    pub total_stock_value: f64,
    pub categories_count: usize,
}

impl InventoryStats {
    pub fn collect(ingredients: &[Ingredient]) -> Self {
        let mut stats = Self {
            total_ingredients: ingredients.len(),
            ..Self::default()
        };

        let mut categories: HashSet<&str> = HashSet::new();
        for ingredient in ingredients {
            if stock_status(ingredient) == StockStatus::Low {
                stats.low_stock_count += 1;
            }
            stats.total_stock_value += total_value(ingredient);
            categories.insert(ingredient.category_id.as_str());
        }
        stats.categories_count = categories.len();

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(stock: f64, min_stock: f64) -> Ingredient {
        Ingredient {
            id: "i-1".to_string(),
            name: "Flour".to_string(),
            unit: "kg".to_string(),
            unit_cost: 4.5,
            stock,
            min_stock,
            expiration_date: None,
            category_id: "c-1".to_string(),
            supplier_id: None,
            is_active: 1,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn expiring(date: &str) -> Ingredient {
        let mut i = ingredient(10.0, 5.0);
        i.expiration_date = Some(date.to_string());
        i
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_stock_status_boundaries() {
        // Equality at min_stock is low, not medium
        assert_eq!(stock_status(&ingredient(10.0, 10.0)), StockStatus::Low);
        assert_eq!(stock_status(&ingredient(9.0, 10.0)), StockStatus::Low);
        assert_eq!(stock_status(&ingredient(14.0, 10.0)), StockStatus::Medium);
        // 1.5x boundary is still medium
        assert_eq!(stock_status(&ingredient(15.0, 10.0)), StockStatus::Medium);
        assert_eq!(stock_status(&ingredient(15.1, 10.0)), StockStatus::Good);
    }

    #[test]
    fn test_total_value_linear() {
        let mut i = ingredient(25.5, 0.0);
        i.unit_cost = 4.5;
        assert!((total_value(&i) - 114.75).abs() < 1e-9);
    }

    #[test]
    fn test_no_expiration_never_flags() {
        let i = ingredient(10.0, 5.0);
        let today = day("2025-06-15");
        assert!(!is_expired(&i, today));
        assert!(!is_expiring_soon(&i, today, EXPIRY_HORIZON_DAYS));
    }

    #[test]
    fn test_expiry_on_as_of_is_neither() {
        let i = expiring("2025-06-15");
        let today = day("2025-06-15");
        assert!(!is_expired(&i, today));
        assert!(!is_expiring_soon(&i, today, EXPIRY_HORIZON_DAYS));
    }

    #[test]
    fn test_expired_strictly_before() {
        let i = expiring("2025-06-14");
        let today = day("2025-06-15");
        assert!(is_expired(&i, today));
        assert!(!is_expiring_soon(&i, today, EXPIRY_HORIZON_DAYS));
    }

    #[test]
    fn test_expiring_soon_horizon() {
        let today = day("2025-06-15");
        // Tomorrow and the 30th day are in the window; the 31st is not
        assert!(is_expiring_soon(&expiring("2025-06-16"), today, 30));
        assert!(is_expiring_soon(&expiring("2025-07-15"), today, 30));
        assert!(!is_expiring_soon(&expiring("2025-07-16"), today, 30));
    }

    #[test]
    fn test_predicates_mutually_exclusive() {
        let today = day("2025-06-15");
        for date in ["2025-05-01", "2025-06-14", "2025-06-15", "2025-06-16", "2025-09-01"] {
            let i = expiring(date);
            assert!(
                !(is_expired(&i, today) && is_expiring_soon(&i, today, EXPIRY_HORIZON_DAYS)),
                "both flags set for {}",
                date
            );
        }
    }

    #[test]
    fn test_stats_aggregation() {
        let mut a = ingredient(10.0, 10.0); // low
        a.unit_cost = 2.0; // value 20.0
        let mut b = ingredient(20.0, 10.0); // good
        b.unit_cost = 1.0; // value 20.0
        b.category_id = "c-2".to_string();
        let mut c = ingredient(5.0, 10.0); // low
        c.unit_cost = 0.5; // value 2.5
        c.category_id = "c-2".to_string();

        let stats = InventoryStats::collect(&[a, b, c]);
        assert_eq!(stats.total_ingredients, 3);
        assert_eq!(stats.low_stock_count, 2);
        assert!((stats.total_stock_value - 42.5).abs() < 1e-9);
        assert_eq!(stats.categories_count, 2);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(InventoryStats::collect(&[]), InventoryStats::default());
    }
}
