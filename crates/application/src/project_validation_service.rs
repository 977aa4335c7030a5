//! Per-project accounting consistency reports.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use tessera_core::{AppError, AppResult, ProjectId};
use tessera_domain::validation::{
    DEFAULT_AMOUNT_TOLERANCE, DEFAULT_USAGE_RATE_MARGIN, ValidationResult, ValidationSummary,
    actual_personnel_cost, check_budget_consistency, check_member_employment,
    check_participation_rates, check_personnel_cost, check_usage_rates,
};
use tessera_domain::{EvidenceItem, Project, ProjectBudget, ProjectMember};

/// Repository port for project accounting reads.
#[async_trait]
pub trait ProjectAccountingRepository: Send + Sync {
    /// Finds a project by id.
    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>>;

    /// Lists the project's period budgets in period order.
    async fn list_budgets(&self, project_id: ProjectId) -> AppResult<Vec<ProjectBudget>>;

    /// Lists the project's declared members.
    async fn list_members(&self, project_id: ProjectId) -> AppResult<Vec<ProjectMember>>;

    /// Lists the project's spending evidence.
    async fn list_evidence(&self, project_id: ProjectId) -> AppResult<Vec<EvidenceItem>>;
}

/// Tunable thresholds for the accounting checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPolicy {
    /// Absolute amount discrepancy treated as equal.
    pub amount_tolerance: f64,
    /// Allowed divergence between category and overall usage rates.
    pub usage_rate_margin: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            amount_tolerance: DEFAULT_AMOUNT_TOLERANCE,
            usage_rate_margin: DEFAULT_USAGE_RATE_MARGIN,
        }
    }
}

/// One check outcome tied to a budget period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodCheck {
    /// Budget period the check ran against.
    pub period_number: u32,
    /// Check outcome.
    pub result: ValidationResult,
}

/// One check outcome tied to a project member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberCheck {
    /// Member display name, or a placeholder when the record carries none.
    pub member_name: String,
    /// Check outcome.
    pub result: ValidationResult,
}

/// Full consistency report for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectValidationReport {
    /// Project under review.
    pub project_id: ProjectId,
    /// Project title, for display.
    pub project_title: String,
    /// Project total vs period budget totals.
    pub budget_consistency: ValidationResult,
    /// Declared vs computed personnel cost, one per period.
    pub personnel_costs: Vec<PeriodCheck>,
    /// Category burn-rate consistency, one per period.
    pub usage_rates: Vec<PeriodCheck>,
    /// Employment-window containment, one per member.
    pub employment_periods: Vec<MemberCheck>,
    /// Individual and concurrent participation rates.
    pub participation_rates: ValidationResult,
    /// Aggregate over every check above.
    pub summary: ValidationSummary,
}

/// Uniform caller-facing envelope for report requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope<T> {
    /// Whether the request produced data.
    pub success: bool,
    /// Payload on success.
    pub data: Option<T>,
    /// Error description on failure.
    pub error: Option<EnvelopeError>,
}

/// Error branch of [`ResponseEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeError {
    /// Short, stable failure description.
    pub message: String,
    /// Underlying error message, when one exists.
    pub detail: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    /// Creates a success envelope.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Creates a failure envelope.
    #[must_use]
    pub fn failure(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(EnvelopeError {
                message: message.into(),
                detail,
            }),
        }
    }
}

/// Application service assembling per-project consistency reports.
#[derive(Clone)]
pub struct ProjectValidationService {
    repository: Arc<dyn ProjectAccountingRepository>,
    policy: ValidationPolicy,
}

impl ProjectValidationService {
    /// Creates a new service from a repository and check thresholds.
    #[must_use]
    pub fn new(repository: Arc<dyn ProjectAccountingRepository>, policy: ValidationPolicy) -> Self {
        Self { repository, policy }
    }

    /// Runs every consistency check against one project.
    ///
    /// Rule violations land in the report; only storage failures and a
    /// missing project travel the error path.
    pub async fn validate_project(
        &self,
        project_id: ProjectId,
    ) -> AppResult<ProjectValidationReport> {
        let project = self
            .repository
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}'")))?;
        let budgets = self.repository.list_budgets(project_id).await?;
        let members = self.repository.list_members(project_id).await?;
        let evidence = self.repository.list_evidence(project_id).await?;

        let budget_consistency =
            check_budget_consistency(&project, &budgets, self.policy.amount_tolerance);

        let personnel_costs: Vec<PeriodCheck> = budgets
            .iter()
            .map(|budget| PeriodCheck {
                period_number: budget.period_number,
                result: check_personnel_cost(
                    budget,
                    actual_personnel_cost(&members, budget),
                    self.policy.amount_tolerance,
                ),
            })
            .collect();

        let usage_rates: Vec<PeriodCheck> = budgets
            .iter()
            .map(|budget| PeriodCheck {
                period_number: budget.period_number,
                result: check_usage_rates(budget, &evidence, self.policy.usage_rate_margin),
            })
            .collect();

        let employment_periods: Vec<MemberCheck> = members
            .iter()
            .map(|member| MemberCheck {
                member_name: member
                    .display_name()
                    .unwrap_or_else(|| "unnamed member".to_owned()),
                result: check_member_employment(member),
            })
            .collect();

        let participation_rates = check_participation_rates(&members);

        let mut results = vec![budget_consistency.clone()];
        results.extend(personnel_costs.iter().map(|check| check.result.clone()));
        results.extend(usage_rates.iter().map(|check| check.result.clone()));
        results.extend(employment_periods.iter().map(|check| check.result.clone()));
        results.push(participation_rates.clone());
        let summary = ValidationSummary::from_results(results);

        Ok(ProjectValidationReport {
            project_id,
            project_title: project.title,
            budget_consistency,
            personnel_costs,
            usage_rates,
            employment_periods,
            participation_rates,
            summary,
        })
    }

    /// Runs [`Self::validate_project`] and folds the outcome into the uniform
    /// caller-facing envelope.
    pub async fn validation_report(
        &self,
        project_id: ProjectId,
    ) -> ResponseEnvelope<ProjectValidationReport> {
        match self.validate_project(project_id).await {
            Ok(report) => ResponseEnvelope::ok(report),
            Err(error) => {
                ResponseEnvelope::failure("project validation failed", Some(error.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use tessera_core::{AppResult, ProjectId};
    use tessera_domain::validation::ValidationReason;
    use tessera_domain::{EvidenceItem, Project, ProjectBudget, ProjectMember};

    use super::{
        ProjectAccountingRepository, ProjectValidationService, ValidationPolicy,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    struct FakeProjectAccountingRepository {
        project: Option<Project>,
        budgets: Vec<ProjectBudget>,
        members: Vec<ProjectMember>,
        evidence: Vec<EvidenceItem>,
    }

    #[async_trait]
    impl ProjectAccountingRepository for FakeProjectAccountingRepository {
        async fn find_project(&self, _: ProjectId) -> AppResult<Option<Project>> {
            Ok(self.project.clone())
        }

        async fn list_budgets(&self, _: ProjectId) -> AppResult<Vec<ProjectBudget>> {
            Ok(self.budgets.clone())
        }

        async fn list_members(&self, _: ProjectId) -> AppResult<Vec<ProjectMember>> {
            Ok(self.members.clone())
        }

        async fn list_evidence(&self, _: ProjectId) -> AppResult<Vec<EvidenceItem>> {
            Ok(self.evidence.clone())
        }
    }

    fn consistent_fixture(project_id: ProjectId) -> FakeProjectAccountingRepository {
        // One-year project: 12 months x 1,000,000 at 50% = 6,000,000 personnel.
        let project = Project {
            id: project_id,
            title: "Battery materials study".to_owned(),
            total_budget: 10_000_000.0,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
        };
        let budgets = vec![ProjectBudget {
            period_number: 1,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
            total_budget: 10_000_000.0,
            personnel_cost: 6_000_000.0,
            spent_amount: 5_000_000.0,
        }];
        let members = vec![ProjectMember {
            first_name: "Seojun".to_owned(),
            last_name: "Han".to_owned(),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
            monthly_amount: 1_000_000.0,
            participation_rate: 50.0,
            hire_date: Some(date(2024, 1, 1)),
            termination_date: None,
        }];
        let evidence = vec![
            EvidenceItem {
                period_number: 1,
                category_name: "personnel".to_owned(),
                spent_amount: 3_000_000.0,
            },
            EvidenceItem {
                period_number: 1,
                category_name: "equipment".to_owned(),
                spent_amount: 2_000_000.0,
            },
        ];
        FakeProjectAccountingRepository {
            project: Some(project),
            budgets,
            members,
            evidence,
        }
    }

    #[tokio::test]
    async fn consistent_project_passes_every_check() {
        let project_id = ProjectId::new();
        let service = ProjectValidationService::new(
            Arc::new(consistent_fixture(project_id)),
            ValidationPolicy::default(),
        );

        let report = match service.validate_project(project_id).await {
            Ok(report) => report,
            Err(error) => panic!("report should resolve: {error}"),
        };
        assert!(report.summary.is_valid);
        assert_eq!(report.summary.total_checks, 5);
        assert!(report.budget_consistency.is_valid);
        assert!(report.participation_rates.is_valid);
    }

    #[tokio::test]
    async fn inconsistent_budget_is_reported_not_errored() {
        let project_id = ProjectId::new();
        let mut fixture = consistent_fixture(project_id);
        if let Some(project) = fixture.project.as_mut() {
            project.total_budget = 12_000_000.0;
        }
        let service =
            ProjectValidationService::new(Arc::new(fixture), ValidationPolicy::default());

        let report = match service.validate_project(project_id).await {
            Ok(report) => report,
            Err(error) => panic!("report should resolve: {error}"),
        };
        assert!(!report.summary.is_valid);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(
            report.budget_consistency.reason,
            ValidationReason::BudgetInconsistency
        );
    }

    #[tokio::test]
    async fn missing_project_folds_into_error_envelope() {
        let service = ProjectValidationService::new(
            Arc::new(FakeProjectAccountingRepository {
                project: None,
                budgets: vec![],
                members: vec![],
                evidence: vec![],
            }),
            ValidationPolicy::default(),
        );

        let envelope = service.validation_report(ProjectId::new()).await;
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        let error = envelope.error;
        assert!(error.is_some_and(|error| {
            error.message == "project validation failed"
                && error.detail.is_some_and(|detail| detail.contains("not found"))
        }));
    }

    #[tokio::test]
    async fn envelope_wraps_successful_report() {
        let project_id = ProjectId::new();
        let service = ProjectValidationService::new(
            Arc::new(consistent_fixture(project_id)),
            ValidationPolicy::default(),
        );

        let envelope = service.validation_report(project_id).await;
        assert!(envelope.success);
        assert!(envelope.error.is_none());
        assert!(envelope.data.is_some_and(|report| report.summary.is_valid));
    }
}
