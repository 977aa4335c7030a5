use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use tessera_application::PermissionCacheRepository;
use tessera_core::{AppError, AppResult, PrincipalId};
use tessera_domain::{PermissionGrant, PermissionSnapshot, Role};

/// PostgreSQL-backed store for per-employee permission snapshots.
///
/// The permission and role lists are persisted as serialized JSON text; the
/// row is only ever read and replaced as a whole.
#[derive(Clone)]
pub struct PostgresPermissionCacheRepository {
    pool: PgPool,
}

impl PostgresPermissionCacheRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SnapshotRow {
    employee_id: uuid::Uuid,
    permissions: String,
    roles: String,
    calculated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

fn decode_snapshot(row: SnapshotRow) -> AppResult<PermissionSnapshot> {
    let permissions: Vec<PermissionGrant> =
        serde_json::from_str(row.permissions.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode cached permissions for employee '{}': {error}",
                row.employee_id
            ))
        })?;
    let roles: Vec<Role> = serde_json::from_str(row.roles.as_str()).map_err(|error| {
        AppError::Internal(format!(
            "failed to decode cached roles for employee '{}': {error}",
            row.employee_id
        ))
    })?;

    Ok(PermissionSnapshot {
        employee_id: PrincipalId::from_uuid(row.employee_id),
        permissions,
        roles,
        calculated_at: row.calculated_at,
        expires_at: row.expires_at,
    })
}

#[async_trait]
impl PermissionCacheRepository for PostgresPermissionCacheRepository {
    async fn find_current(
        &self,
        employee_id: PrincipalId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionSnapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT employee_id, permissions, roles, calculated_at, expires_at
            FROM permission_cache_entries
            WHERE employee_id = $1 AND expires_at > $2
            "#,
        )
        .bind(employee_id.as_uuid())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load permission snapshot: {error}"))
        })?;

        row.map(decode_snapshot).transpose()
    }

    async fn replace(&self, snapshot: &PermissionSnapshot) -> AppResult<()> {
        let permissions = serde_json::to_string(&snapshot.permissions).map_err(|error| {
            AppError::Internal(format!("failed to encode permissions: {error}"))
        })?;
        let roles = serde_json::to_string(&snapshot.roles)
            .map_err(|error| AppError::Internal(format!("failed to encode roles: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO permission_cache_entries (
                employee_id, permissions, roles, calculated_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (employee_id) DO UPDATE
            SET permissions = EXCLUDED.permissions,
                roles = EXCLUDED.roles,
                calculated_at = EXCLUDED.calculated_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(snapshot.employee_id.as_uuid())
        .bind(permissions)
        .bind(roles)
        .bind(snapshot.calculated_at)
        .bind(snapshot.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to replace permission snapshot: {error}"))
        })?;

        Ok(())
    }

    async fn invalidate(&self, employee_id: PrincipalId) -> AppResult<()> {
        sqlx::query("DELETE FROM permission_cache_entries WHERE employee_id = $1")
            .bind(employee_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to invalidate permission snapshot: {error}"))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use tessera_core::{PrincipalId, RoleId};
    use tessera_domain::{PermissionGrant, PermissionScope, Role};

    use super::{SnapshotRow, decode_snapshot};

    #[test]
    fn snapshot_round_trips_through_json_columns() {
        let permissions = vec![PermissionGrant {
            code: "employee.read.all".to_owned(),
            resource: "employee".to_owned(),
            action: "read".to_owned(),
            scope: PermissionScope::All,
        }];
        let roles = vec![Role {
            id: RoleId::new(),
            code: "manager".to_owned(),
            name: "Manager".to_owned(),
            localized_name: "Manager".to_owned(),
            description: None,
            priority: 50,
            parent_role_id: None,
            is_active: true,
        }];
        let now = Utc::now();

        let row = SnapshotRow {
            employee_id: PrincipalId::new().as_uuid(),
            permissions: serde_json::to_string(&permissions).unwrap_or_default(),
            roles: serde_json::to_string(&roles).unwrap_or_default(),
            calculated_at: now,
            expires_at: now + Duration::hours(1),
        };

        let decoded = decode_snapshot(row);
        assert!(decoded.as_ref().is_ok_and(|snapshot| {
            snapshot.permissions == permissions && snapshot.roles == roles
        }));
    }

    #[test]
    fn corrupt_column_is_an_internal_error() {
        let now = Utc::now();
        let row = SnapshotRow {
            employee_id: PrincipalId::new().as_uuid(),
            permissions: "not json".to_owned(),
            roles: "[]".to_owned(),
            calculated_at: now,
            expires_at: now,
        };
        assert!(decode_snapshot(row).is_err());
    }
}
