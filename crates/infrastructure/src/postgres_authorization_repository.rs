use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use tessera_application::AuthorizationRepository;
use tessera_core::{AppError, AppResult, PrincipalId, RoleId};
use tessera_domain::{PermissionGrant, PermissionScope, Role, RoleAssignment};

/// PostgreSQL-backed repository for roles, permissions, and assignments.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    code: String,
    name: String,
    localized_name: String,
    description: Option<String>,
    priority: i32,
    parent_role_id: Option<uuid::Uuid>,
    is_active: bool,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: RoleId::from_uuid(row.id),
            code: row.code,
            name: row.name,
            localized_name: row.localized_name,
            description: row.description,
            priority: row.priority,
            parent_role_id: row.parent_role_id.map(RoleId::from_uuid),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    code: String,
    resource: String,
    action: String,
    scope: String,
}

impl TryFrom<PermissionRow> for PermissionGrant {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        let scope = PermissionScope::from_str(row.scope.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode scope of permission '{}': {error}",
                row.code
            ))
        })?;
        Ok(Self {
            code: row.code,
            resource: row.resource,
            action: row.action,
            scope,
        })
    }
}

const ROLE_COLUMNS: &str =
    "id, code, name, localized_name, description, priority, parent_role_id, is_active";

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_active_roles_for_employee(
        &self,
        employee_id: PrincipalId,
    ) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id, roles.code, roles.name, roles.localized_name,
                roles.description, roles.priority, roles.parent_role_id, roles.is_active
            FROM roles
            INNER JOIN employee_role_assignments AS assignments
                ON assignments.role_id = roles.id
            WHERE assignments.employee_id = $1
                AND assignments.is_active
                AND roles.is_active
            ORDER BY roles.priority DESC
            "#,
        )
        .bind(employee_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load employee roles: {error}")))?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn list_permissions_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<PermissionGrant>> {
        let ids: Vec<uuid::Uuid> = role_ids.iter().map(RoleId::as_uuid).collect();
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.code, permissions.resource, permissions.action, permissions.scope
            FROM permissions
            INNER JOIN role_permissions
                ON role_permissions.permission_code = permissions.code
            WHERE role_permissions.role_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role permissions: {error}")))?;

        rows.into_iter().map(PermissionGrant::try_from).collect()
    }

    async fn list_active_roles(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE is_active ORDER BY priority DESC, code"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn list_all_permissions(&self) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT code, resource, action, scope FROM permissions ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(PermissionGrant::try_from).collect()
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.code, permissions.resource, permissions.action, permissions.scope
            FROM permissions
            INNER JOIN role_permissions
                ON role_permissions.permission_code = permissions.code
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.code
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role permissions: {error}")))?;

        rows.into_iter().map(PermissionGrant::try_from).collect()
    }

    async fn find_active_role_by_code(&self, code: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE code = $1 AND is_active"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role '{code}': {error}")))?;

        Ok(row.map(Role::from))
    }

    async fn find_role_by_code(&self, code: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM roles WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role '{code}': {error}")))?;

        Ok(row.map(Role::from))
    }

    async fn upsert_role_assignment(&self, assignment: &RoleAssignment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO employee_role_assignments (
                employee_id, role_id, assigned_by_employee_id,
                assigned_at, expires_at, is_active
            )
            VALUES ($1, $2, $3, $4, $5, true)
            ON CONFLICT (employee_id, role_id) DO UPDATE
            SET assigned_by_employee_id = EXCLUDED.assigned_by_employee_id,
                assigned_at = EXCLUDED.assigned_at,
                expires_at = EXCLUDED.expires_at,
                is_active = true
            "#,
        )
        .bind(assignment.employee_id.as_uuid())
        .bind(assignment.role_id.as_uuid())
        .bind(assignment.assigned_by.map(|principal| principal.as_uuid()))
        .bind(assignment.assigned_at)
        .bind(assignment.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to upsert role assignment: {error}"))
        })?;

        Ok(())
    }

    async fn deactivate_role_assignment(
        &self,
        employee_id: PrincipalId,
        role_id: RoleId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE employee_role_assignments
            SET is_active = false
            WHERE employee_id = $1 AND role_id = $2
            "#,
        )
        .bind(employee_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to deactivate role assignment: {error}"))
        })?;

        Ok(())
    }
}
