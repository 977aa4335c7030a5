use crate::project::{EvidenceItem, ProjectBudget, ProjectMember};

use super::result::{ValidationReason, ValidationResult};

/// Checks that a member's participation interval lies within their employment
/// window.
#[must_use]
pub fn check_member_employment(member: &ProjectMember) -> ValidationResult {
    let Some(name) = member.display_name() else {
        return ValidationResult::invalid(
            ValidationReason::EmployeeNotFound,
            "project member carries no resolvable employee record",
        );
    };

    let mut issues = Vec::new();
    if let Some(hire_date) = member.hire_date {
        if member.start_date < hire_date {
            issues.push(format!(
                "{name}: participation starts {} before hire date {}",
                member.start_date, hire_date
            ));
        }
    }
    if let Some(termination_date) = member.termination_date {
        if termination_date < member.end_date {
            issues.push(format!(
                "{name}: participation runs until {} past termination date {}",
                member.end_date, termination_date
            ));
        }
    }

    if issues.is_empty() {
        return ValidationResult::valid(format!("{name}: participation lies within employment"));
    }

    ValidationResult::invalid(
        ValidationReason::EmploymentPeriodInvalid,
        format!("{name}: participation falls outside the employment window"),
    )
    .with_issues(issues)
}

/// Checks that a spending record's budget period lies within the employment
/// window of the person it is attributed to.
#[must_use]
pub fn check_evidence_employment(
    evidence: &EvidenceItem,
    period: &ProjectBudget,
    employee: Option<&ProjectMember>,
) -> ValidationResult {
    let Some(employee) = employee else {
        return ValidationResult::invalid(
            ValidationReason::EmployeeNotFound,
            format!(
                "no employee record for '{}' spending in period {}",
                evidence.category_name, evidence.period_number
            ),
        );
    };

    let name = employee
        .display_name()
        .unwrap_or_else(|| "unnamed employee".to_owned());
    let mut issues = Vec::new();
    if let Some(hire_date) = employee.hire_date {
        if period.start_date < hire_date {
            issues.push(format!(
                "{name}: period {} starts {} before hire date {}",
                period.period_number, period.start_date, hire_date
            ));
        }
    }
    if let Some(termination_date) = employee.termination_date {
        if termination_date < period.end_date {
            issues.push(format!(
                "{name}: period {} ends {} past termination date {}",
                period.period_number, period.end_date, termination_date
            ));
        }
    }

    if issues.is_empty() {
        return ValidationResult::valid(format!(
            "{name}: spending period lies within employment"
        ));
    }

    ValidationResult::invalid(
        ValidationReason::EmploymentPeriodInvalid,
        format!("{name}: spending recorded outside the employment window"),
    )
    .with_issues(issues)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::project::{EvidenceItem, ProjectBudget, ProjectMember};
    use crate::validation::result::ValidationReason;

    use super::{check_evidence_employment, check_member_employment};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    fn member() -> ProjectMember {
        ProjectMember {
            first_name: "Doyun".to_owned(),
            last_name: "Lee".to_owned(),
            start_date: date(2025, 3, 1),
            end_date: date(2025, 12, 31),
            monthly_amount: 1_000_000.0,
            participation_rate: 100.0,
            hire_date: Some(date(2024, 6, 1)),
            termination_date: None,
        }
    }

    #[test]
    fn participation_within_employment_passes() {
        assert!(check_member_employment(&member()).is_valid);
    }

    #[test]
    fn participation_before_hire_is_invalid() {
        let mut early = member();
        early.start_date = date(2024, 1, 1);
        let result = check_member_employment(&early);
        assert!(!result.is_valid);
        assert_eq!(result.reason, ValidationReason::EmploymentPeriodInvalid);
    }

    #[test]
    fn participation_past_termination_is_invalid() {
        let mut terminated = member();
        terminated.termination_date = Some(date(2025, 9, 30));
        let result = check_member_employment(&terminated);
        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn nameless_member_is_reported_missing() {
        let mut anonymous = member();
        anonymous.first_name = String::new();
        anonymous.last_name = "  ".to_owned();
        let result = check_member_employment(&anonymous);
        assert_eq!(result.reason, ValidationReason::EmployeeNotFound);
    }

    #[test]
    fn evidence_without_employee_is_reported_missing() {
        let evidence = EvidenceItem {
            period_number: 1,
            category_name: "personnel".to_owned(),
            spent_amount: 500_000.0,
        };
        let period = ProjectBudget {
            period_number: 1,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
            total_budget: 0.0,
            personnel_cost: 0.0,
            spent_amount: 0.0,
        };
        let result = check_evidence_employment(&evidence, &period, None);
        assert_eq!(result.reason, ValidationReason::EmployeeNotFound);
    }

    #[test]
    fn evidence_inside_employment_window_passes() {
        let evidence = EvidenceItem {
            period_number: 1,
            category_name: "personnel".to_owned(),
            spent_amount: 500_000.0,
        };
        let period = ProjectBudget {
            period_number: 1,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 6, 30),
            total_budget: 0.0,
            personnel_cost: 0.0,
            spent_amount: 0.0,
        };
        let result = check_evidence_employment(&evidence, &period, Some(&member()));
        assert!(result.is_valid);
    }
}
