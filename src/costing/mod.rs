//! Recipe costing.
//!
//! Validates recipe drafts before they reach the database and derives cost
//! figures from ingredient quantities. Operational cost is supplied by the
//! caller and never derived from ingredient cost: it covers labor and
//! overhead the ingredient sum cannot see, and the two are tracked
//! independently.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::db::RecipeLine;

/// Errors from draft validation and cost computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostingError {
    #[error("Recipe name is required")]
    EmptyName,

    #[error("Servings must be at least 1")]
    InvalidServings,

    #[error("Instructions are required")]
    EmptyInstructions,

    #[error("Recipe needs at least one ingredient")]
    NoIngredients,

    #[error("Ingredient {ingredient_id} has a non-positive quantity")]
    NonPositiveQuantity { ingredient_id: String },

    #[error("Ingredient {ingredient_id} appears more than once")]
    DuplicateIngredient { ingredient_id: String },

    #[error("Unknown ingredient: {ingredient_id}")]
    UnknownIngredient { ingredient_id: String },
}

/// The validatable core of a recipe submission
#[derive(Debug)]
pub struct RecipeDraft<'a> {
    pub name: &'a str,
    pub servings: i64,
    pub instructions: &'a str,
    pub lines: &'a [RecipeLine],
}

/// Validate a draft against the set of ingredient ids that currently exist.
///
/// Runs before any persistence call; the first violation is returned.
/// A duplicated ingredient id is an explicit error, never a silent merge.
pub fn validate_draft(
    draft: &RecipeDraft<'_>,
    known_ids: &HashSet<String>,
) -> Result<(), CostingError> {
    if draft.name.trim().is_empty() {
        return Err(CostingError::EmptyName);
    }
    if draft.servings < 1 {
        return Err(CostingError::InvalidServings);
    }
    if draft.instructions.trim().is_empty() {
        return Err(CostingError::EmptyInstructions);
    }
    if draft.lines.is_empty() {
        return Err(CostingError::NoIngredients);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for line in draft.lines {
        if line.quantity <= 0.0 {
            return Err(CostingError::NonPositiveQuantity {
                ingredient_id: line.ingredient_id.clone(),
            });
        }
        if !known_ids.contains(&line.ingredient_id) {
            return Err(CostingError::UnknownIngredient {
                ingredient_id: line.ingredient_id.clone(),
            });
        }
        if !seen.insert(line.ingredient_id.as_str()) {
            return Err(CostingError::DuplicateIngredient {
                ingredient_id: line.ingredient_id.clone(),
            });
        }
    }

    Ok(())
}

/// Total raw-ingredient cost of a recipe: Σ quantity × unit cost.
///
/// `unit_costs` maps ingredient id to unit cost. A line whose id is missing
/// fails the whole computation; the ingredient may have been deleted after
/// the recipe was created.
pub fn ingredient_cost(
    lines: &[RecipeLine],
    unit_costs: &HashMap<String, f64>,
) -> Result<f64, CostingError> {
    let mut total = 0.0;
    for line in lines {
        let unit_cost =
            unit_costs
                .get(&line.ingredient_id)
                .ok_or_else(|| CostingError::UnknownIngredient {
                    ingredient_id: line.ingredient_id.clone(),
                })?;
        total += line.quantity * unit_cost;
    }
    Ok(total)
}

/// Selling price minus operational cost
pub fn margin(selling_price: f64, operational_cost: f64) -> f64 {
    selling_price - operational_cost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: f64) -> RecipeLine {
        RecipeLine {
            ingredient_id: id.to_string(),
            quantity,
        }
    }

    fn known(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn draft<'a>(lines: &'a [RecipeLine]) -> RecipeDraft<'a> {
        RecipeDraft {
            name: "Pão francês",
            servings: 20,
            instructions: "Mix, rest, bake.",
            lines,
        }
    }

    #[test]
    fn test_valid_draft() {
        let lines = [line("flour", 2.0), line("yeast", 0.05)];
        assert_eq!(validate_draft(&draft(&lines), &known(&["flour", "yeast"])), Ok(()));
    }

    #[test]
    fn test_rejects_empty_fields() {
        let lines = [line("flour", 1.0)];
        let ids = known(&["flour"]);

        let mut d = draft(&lines);
        d.name = "  ";
        assert_eq!(validate_draft(&d, &ids), Err(CostingError::EmptyName));

        let mut d = draft(&lines);
        d.servings = 0;
        assert_eq!(validate_draft(&d, &ids), Err(CostingError::InvalidServings));

        let mut d = draft(&lines);
        d.instructions = "";
        assert_eq!(validate_draft(&d, &ids), Err(CostingError::EmptyInstructions));
    }

    #[test]
    fn test_rejects_empty_ingredient_list() {
        assert_eq!(
            validate_draft(&draft(&[]), &known(&["flour"])),
            Err(CostingError::NoIngredients)
        );
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let lines = [line("flour", 0.0)];
        assert_eq!(
            validate_draft(&draft(&lines), &known(&["flour"])),
            Err(CostingError::NonPositiveQuantity {
                ingredient_id: "flour".to_string()
            })
        );

        let lines = [line("flour", -1.0)];
        assert!(validate_draft(&draft(&lines), &known(&["flour"])).is_err());
    }

    #[test]
    fn test_rejects_duplicate_ingredient() {
        let lines = [line("flour", 1.0), line("flour", 2.0)];
        assert_eq!(
            validate_draft(&draft(&lines), &known(&["flour"])),
            Err(CostingError::DuplicateIngredient {
                ingredient_id: "flour".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_unknown_ingredient() {
        let lines = [line("saffron", 1.0)];
        assert_eq!(
            validate_draft(&draft(&lines), &known(&["flour"])),
            Err(CostingError::UnknownIngredient {
                ingredient_id: "saffron".to_string()
            })
        );
    }

    #[test]
    fn test_ingredient_cost_order_invariant() {
        let mut costs = HashMap::new();
        costs.insert("a".to_string(), 3.0);
        costs.insert("b".to_string(), 5.0);

        let forward = [line("a", 2.0), line("b", 1.0)];
        let reverse = [line("b", 1.0), line("a", 2.0)];

        let cost_fwd = ingredient_cost(&forward, &costs).unwrap();
        let cost_rev = ingredient_cost(&reverse, &costs).unwrap();
        assert!((cost_fwd - 11.0).abs() < 1e-9);
        assert!((cost_fwd - cost_rev).abs() < 1e-9);
    }

    #[test]
    fn test_ingredient_cost_unknown_id() {
        let costs = HashMap::new();
        let lines = [line("ghost", 1.0)];
        assert_eq!(
            ingredient_cost(&lines, &costs),
            Err(CostingError::UnknownIngredient {
                ingredient_id: "ghost".to_string()
            })
        );
    }

    #[test]
    fn test_margin() {
        assert!((margin(25.0, 10.0) - 15.0).abs() < 1e-9);
        // Selling below cost goes negative, not clamped
        assert!((margin(8.0, 10.0) + 2.0).abs() < 1e-9);
    }
}
