//! Input validation for planning runs.
//!
//! Structural checks on demands and resource tables before planning.
//! Detects:
//! - Duplicate demand IDs
//! - Zero required hours
//! - Categories missing from the priority order (without an explicit rank)
//! - Empty or duplicate priority order
//! - Horizon months missing from the capacity table
//!
//! The engines tolerate all of these per demand (they report the demand
//! unscheduled); validation lets callers reject bad input up front.

use crate::models::{CategoryOrder, Demand, Horizon, ResourceLedger};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A demand requires zero hours.
    ZeroHours,
    /// A demand's category has no rank and no override is set.
    UnknownCategory,
    /// The priority order lists a category twice.
    DuplicateCategory,
    /// The priority order has no categories.
    EmptyCategoryOrder,
    /// A horizon month has no capacity row.
    MissingCapacity,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates demands against the category order.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_demands(demands: &[Demand], order: &CategoryOrder) -> ValidationResult {
    let mut errors = Vec::new();

    if order.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCategoryOrder,
            "Priority order has no categories",
        ));
    }

    let mut seen_categories = HashSet::new();
    for category in order.iter() {
        if !seen_categories.insert(category) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateCategory,
                format!("Duplicate category in priority order: {category}"),
            ));
        }
    }

    let mut ids = HashSet::new();
    for demand in demands {
        if !ids.insert(demand.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate demand ID: {}", demand.id),
            ));
        }

        if demand.required_hours == Some(0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroHours,
                format!("Demand '{}' requires zero hours", demand.id),
            ));
        }

        if demand.priority_rank(order).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCategory,
                format!(
                    "Demand '{}' has unknown category '{}' and no explicit priority",
                    demand.id, demand.category
                ),
            ));
        }
    }

    finish(errors)
}

/// Validates that every horizon month has a capacity row.
pub fn validate_ledger(ledger: &ResourceLedger, horizon: &Horizon) -> ValidationResult {
    let errors: Vec<ValidationError> = horizon
        .months()
        .filter(|m| !ledger.knows_month(*m))
        .map(|m| {
            ValidationError::new(
                ValidationErrorKind::MissingCapacity,
                format!("No capacity entry for horizon month {m}"),
            )
        })
        .collect();
    finish(errors)
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
