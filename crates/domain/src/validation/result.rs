use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable symbolic outcome codes for accounting checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
    /// Check passed.
    Valid,
    /// Declared personnel cost diverges from member participation.
    PersonnelCostMismatch,
    /// Record carries no resolvable employee identity.
    EmployeeNotFound,
    /// Participation falls outside the employment window.
    EmploymentPeriodInvalid,
    /// Individual or concurrent participation exceeds full capacity.
    ParticipationRateInvalid,
    /// Period budgets do not add up to the project total.
    BudgetInconsistency,
    /// A cost category burns down out of step with the overall budget.
    UsageRateInconsistency,
}

impl ValidationReason {
    /// Returns a stable storage value for this reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::PersonnelCostMismatch => "PERSONNEL_COST_MISMATCH",
            Self::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            Self::EmploymentPeriodInvalid => "EMPLOYMENT_PERIOD_INVALID",
            Self::ParticipationRateInvalid => "PARTICIPATION_RATE_INVALID",
            Self::BudgetInconsistency => "BUDGET_INCONSISTENCY",
            Self::UsageRateInconsistency => "USAGE_RATE_INCONSISTENCY",
        }
    }
}

/// Uniform outcome of one accounting check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the check passed.
    pub is_valid: bool,
    /// Symbolic outcome code.
    pub reason: ValidationReason,
    /// Human-readable outcome message.
    pub message: String,
    /// Individual findings, empty when the check passed.
    pub issues: Vec<String>,
    /// Optional structured payload for reporting.
    pub details: Option<Value>,
}

impl ValidationResult {
    /// Creates a passing result.
    #[must_use]
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            reason: ValidationReason::Valid,
            message: message.into(),
            issues: Vec::new(),
            details: None,
        }
    }

    /// Creates a failing result with the given reason.
    #[must_use]
    pub fn invalid(reason: ValidationReason, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason,
            message: message.into(),
            issues: Vec::new(),
            details: None,
        }
    }

    /// Attaches individual findings.
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<String>) -> Self {
        self.issues = issues;
        self
    }

    /// Attaches a structured payload.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Aggregate outcome over many checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Number of checks run.
    pub total_checks: usize,
    /// Number of passing checks.
    pub passed: usize,
    /// Number of failing checks.
    pub failed: usize,
    /// Whether every check passed.
    pub is_valid: bool,
    /// The aggregated results, in check order.
    pub results: Vec<ValidationResult>,
}

impl ValidationSummary {
    /// Aggregates results into an overall pass/fail summary with counts.
    #[must_use]
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let passed = results.iter().filter(|result| result.is_valid).count();
        let failed = results.len() - passed;
        Self {
            total_checks: results.len(),
            passed,
            failed,
            is_valid: failed == 0,
            results,
        }
    }
}
