use serde_json::json;

use crate::project::{ProjectBudget, ProjectMember};

use super::result::{ValidationReason, ValidationResult};
use super::support::{amounts_match, months_spanned, overlap_window};

/// Computes the personnel cost implied by member participation within a
/// budget period.
///
/// Each member whose participation interval overlaps the period contributes
/// `months in overlap x monthly amount x participation rate`; members outside
/// the period contribute nothing.
#[must_use]
pub fn actual_personnel_cost(members: &[ProjectMember], budget: &ProjectBudget) -> f64 {
    members
        .iter()
        .filter_map(|member| {
            overlap_window(
                member.start_date,
                member.end_date,
                budget.start_date,
                budget.end_date,
            )
            .map(|(overlap_start, overlap_end)| {
                let months = months_spanned(overlap_start, overlap_end) as f64;
                months * member.monthly_amount * (member.participation_rate / 100.0)
            })
        })
        .sum()
}

/// Checks the declared personnel cost of a period against the cost implied by
/// member participation.
#[must_use]
pub fn check_personnel_cost(
    budget: &ProjectBudget,
    actual_cost: f64,
    tolerance: f64,
) -> ValidationResult {
    if amounts_match(budget.personnel_cost, actual_cost, tolerance) {
        return ValidationResult::valid(format!(
            "personnel cost for period {} matches member participation",
            budget.period_number
        ));
    }

    ValidationResult::invalid(
        ValidationReason::PersonnelCostMismatch,
        format!(
            "declared personnel cost for period {} diverges from member participation",
            budget.period_number
        ),
    )
    .with_issues(vec![
        format!("budgeted personnel cost: {:.0}", budget.personnel_cost),
        format!("actual personnel cost: {actual_cost:.0}"),
    ])
    .with_details(json!({
        "budgeted_cost": budget.personnel_cost,
        "actual_cost": actual_cost,
        "difference": (budget.personnel_cost - actual_cost).abs(),
    }))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::project::{ProjectBudget, ProjectMember};
    use crate::validation::result::ValidationReason;

    use super::{actual_personnel_cost, check_personnel_cost};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    fn budget() -> ProjectBudget {
        ProjectBudget {
            period_number: 1,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 3, 31),
            total_budget: 10_000_000.0,
            personnel_cost: 1_500_000.0,
            spent_amount: 0.0,
        }
    }

    fn member(start: NaiveDate, end: NaiveDate, monthly: f64, rate: f64) -> ProjectMember {
        ProjectMember {
            first_name: "Minseo".to_owned(),
            last_name: "Kim".to_owned(),
            start_date: start,
            end_date: end,
            monthly_amount: monthly,
            participation_rate: rate,
            hire_date: None,
            termination_date: None,
        }
    }

    #[test]
    fn three_months_at_half_rate() {
        let members = vec![member(date(2025, 1, 1), date(2025, 3, 31), 1_000_000.0, 50.0)];
        let actual = actual_personnel_cost(&members, &budget());
        assert!((actual - 1_500_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn member_outside_period_contributes_nothing() {
        let members = vec![
            member(date(2025, 1, 1), date(2025, 3, 31), 1_000_000.0, 50.0),
            member(date(2025, 4, 1), date(2025, 12, 31), 2_000_000.0, 100.0),
        ];
        let actual = actual_personnel_cost(&members, &budget());
        assert!((actual - 1_500_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_overlap_is_clamped_to_the_period() {
        // Feb through May overlaps the Jan-Mar period for 2 months.
        let members = vec![member(date(2025, 2, 1), date(2025, 5, 31), 1_000_000.0, 100.0)];
        let actual = actual_personnel_cost(&members, &budget());
        assert!((actual - 2_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn matching_cost_passes() {
        let result = check_personnel_cost(&budget(), 1_500_400.0, 1_000.0);
        assert!(result.is_valid);
    }

    #[test]
    fn mismatch_reports_both_amounts() {
        let result = check_personnel_cost(&budget(), 900_000.0, 1_000.0);
        assert!(!result.is_valid);
        assert_eq!(result.reason, ValidationReason::PersonnelCostMismatch);
        assert!(result.issues.iter().any(|issue| issue.contains("1500000")));
        assert!(result.issues.iter().any(|issue| issue.contains("900000")));
    }
}
