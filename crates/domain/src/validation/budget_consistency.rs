use serde_json::json;

use crate::project::{Project, ProjectBudget};

use super::result::{ValidationReason, ValidationResult};
use super::support::amounts_match;

/// Checks that period budgets add up to the declared project total.
#[must_use]
pub fn check_budget_consistency(
    project: &Project,
    budgets: &[ProjectBudget],
    tolerance: f64,
) -> ValidationResult {
    let period_total: f64 = budgets.iter().map(|budget| budget.total_budget).sum();

    if amounts_match(project.total_budget, period_total, tolerance) {
        return ValidationResult::valid("period budgets add up to the project total");
    }

    ValidationResult::invalid(
        ValidationReason::BudgetInconsistency,
        "period budgets do not add up to the project total",
    )
    .with_issues(vec![
        format!("project total budget: {:.0}", project.total_budget),
        format!("sum of period budgets: {period_total:.0}"),
    ])
    .with_details(json!({
        "project_total": project.total_budget,
        "period_total": period_total,
        "difference": (project.total_budget - period_total).abs(),
    }))
}
