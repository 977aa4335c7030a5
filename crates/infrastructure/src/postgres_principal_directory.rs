use async_trait::async_trait;
use sqlx::PgPool;

use tessera_application::PrincipalDirectory;
use tessera_core::{AppError, AppResult, PrincipalId};

/// PostgreSQL-backed lookup of which population a principal belongs to.
#[derive(Clone)]
pub struct PostgresPrincipalDirectory {
    pool: PgPool,
}

impl PostgresPrincipalDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalDirectory for PostgresPrincipalDirectory {
    async fn is_system_account(&self, principal_id: PrincipalId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM system_accounts WHERE id = $1)",
        )
        .bind(principal_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to probe system accounts: {error}"))
        })
    }

    async fn is_employee(&self, principal_id: PrincipalId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM employees WHERE id = $1)")
            .bind(principal_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to probe employees: {error}")))
    }
}
