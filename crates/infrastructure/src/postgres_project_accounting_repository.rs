use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use tessera_application::ProjectAccountingRepository;
use tessera_core::{AppError, AppResult, ProjectId};
use tessera_domain::{EvidenceItem, Project, ProjectBudget, ProjectMember};

/// PostgreSQL-backed repository for project accounting reads.
#[derive(Clone)]
pub struct PostgresProjectAccountingRepository {
    pool: PgPool,
}

impl PostgresProjectAccountingRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: uuid::Uuid,
    title: String,
    total_budget: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Debug, FromRow)]
struct BudgetRow {
    period_number: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_budget: f64,
    personnel_cost: f64,
    spent_amount: f64,
}

#[derive(Debug, FromRow)]
struct MemberRow {
    first_name: String,
    last_name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    monthly_amount: f64,
    participation_rate: f64,
    hire_date: Option<NaiveDate>,
    termination_date: Option<NaiveDate>,
}

#[derive(Debug, FromRow)]
struct EvidenceRow {
    period_number: i32,
    category_name: String,
    spent_amount: f64,
}

fn period_number(value: i32) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::Internal(format!("negative budget period number {value}")))
}

#[async_trait]
impl ProjectAccountingRepository for PostgresProjectAccountingRepository {
    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, title, total_budget, start_date, end_date
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load project: {error}")))?;

        Ok(row.map(|row| Project {
            id: ProjectId::from_uuid(row.id),
            title: row.title,
            total_budget: row.total_budget,
            start_date: row.start_date,
            end_date: row.end_date,
        }))
    }

    async fn list_budgets(&self, project_id: ProjectId) -> AppResult<Vec<ProjectBudget>> {
        let rows = sqlx::query_as::<_, BudgetRow>(
            r#"
            SELECT period_number, start_date, end_date,
                   total_budget, personnel_cost, spent_amount
            FROM project_budgets
            WHERE project_id = $1
            ORDER BY period_number
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load project budgets: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(ProjectBudget {
                    period_number: period_number(row.period_number)?,
                    start_date: row.start_date,
                    end_date: row.end_date,
                    total_budget: row.total_budget,
                    personnel_cost: row.personnel_cost,
                    spent_amount: row.spent_amount,
                })
            })
            .collect()
    }

    async fn list_members(&self, project_id: ProjectId) -> AppResult<Vec<ProjectMember>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT first_name, last_name, start_date, end_date,
                   monthly_amount, participation_rate, hire_date, termination_date
            FROM project_members
            WHERE project_id = $1
            ORDER BY start_date, last_name, first_name
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load project members: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| ProjectMember {
                first_name: row.first_name,
                last_name: row.last_name,
                start_date: row.start_date,
                end_date: row.end_date,
                monthly_amount: row.monthly_amount,
                participation_rate: row.participation_rate,
                hire_date: row.hire_date,
                termination_date: row.termination_date,
            })
            .collect())
    }

    async fn list_evidence(&self, project_id: ProjectId) -> AppResult<Vec<EvidenceItem>> {
        let rows = sqlx::query_as::<_, EvidenceRow>(
            r#"
            SELECT period_number, category_name, spent_amount
            FROM project_evidence_items
            WHERE project_id = $1
            ORDER BY period_number, category_name
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load project evidence: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(EvidenceItem {
                    period_number: period_number(row.period_number)?,
                    category_name: row.category_name,
                    spent_amount: row.spent_amount,
                })
            })
            .collect()
    }
}
