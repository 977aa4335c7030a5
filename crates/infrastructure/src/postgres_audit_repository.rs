use async_trait::async_trait;
use sqlx::PgPool;

use tessera_application::{AuditEvent, AuditRepository};
use tessera_core::{AppError, AppResult};

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_audit_entries (
                actor_employee_id,
                action,
                target_employee_id,
                target_role_id,
                detail
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.actor_employee_id.map(|principal| principal.as_uuid()))
        .bind(event.action.as_str())
        .bind(event.target_employee_id.map(|principal| principal.as_uuid()))
        .bind(event.target_role_id.map(|role| role.as_uuid()))
        .bind(event.detail.map(|detail| detail.to_string()))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }
}
