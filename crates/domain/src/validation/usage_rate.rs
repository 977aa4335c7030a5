use std::collections::BTreeMap;

use crate::project::{EvidenceItem, ProjectBudget};

use super::result::{ValidationReason, ValidationResult};

/// Default allowed divergence between a category usage rate and the overall
/// rate, as a rate fraction.
pub const DEFAULT_USAGE_RATE_MARGIN: f64 = 0.3;

const PERSONNEL_CATEGORY: &str = "personnel";

/// Checks that each cost category burns down in step with the period's
/// overall usage rate.
///
/// The personnel category is measured against the declared personnel cost;
/// every other category shares the non-personnel remainder. This is a
/// heuristic consistency signal, not a hard accounting rule: a category far
/// ahead of or behind the overall burn rate is flagged for review.
#[must_use]
pub fn check_usage_rates(
    budget: &ProjectBudget,
    evidence: &[EvidenceItem],
    margin: f64,
) -> ValidationResult {
    if budget.total_budget <= 0.0 {
        return ValidationResult::valid(format!(
            "period {} declares no budget to measure against",
            budget.period_number
        ));
    }

    let overall_rate = budget.spent_amount / budget.total_budget;

    let mut spent_by_category: BTreeMap<String, f64> = BTreeMap::new();
    for item in evidence {
        if item.period_number != budget.period_number {
            continue;
        }
        *spent_by_category
            .entry(item.category_name.trim().to_lowercase())
            .or_insert(0.0) += item.spent_amount;
    }

    let mut issues = Vec::new();
    for (category, spent) in &spent_by_category {
        let budgeted = if category == PERSONNEL_CATEGORY {
            budget.personnel_cost
        } else {
            budget.total_budget - budget.personnel_cost
        };
        if budgeted <= 0.0 {
            continue;
        }
        let category_rate = spent / budgeted;
        if (category_rate - overall_rate).abs() > margin {
            issues.push(format!(
                "category '{category}' usage rate {:.1}% diverges from overall {:.1}%",
                category_rate * 100.0,
                overall_rate * 100.0
            ));
        }
    }

    if issues.is_empty() {
        return ValidationResult::valid(format!(
            "category usage tracks the overall rate for period {}",
            budget.period_number
        ));
    }

    ValidationResult::invalid(
        ValidationReason::UsageRateInconsistency,
        format!(
            "category usage diverges from the overall rate for period {}",
            budget.period_number
        ),
    )
    .with_issues(issues)
}
