//! Effective-permission resolution with a persisted per-employee cache.
//!
//! Employee snapshots are cached for one hour and invalidated on every role
//! change. System accounts bypass the cache and resolve to a virtual snapshot
//! holding every active permission and role. Boolean queries never propagate
//! internal failures: an unresolvable authorization state is answered with a
//! denial.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::warn;

use tessera_core::{AppError, AppResult, DepartmentId, PrincipalId, RoleId};
use tessera_domain::{
    AuditAction, PermissionGrant, PermissionScope, PermissionSnapshot, Role, RoleAssignment,
};

use crate::{AuditEvent, AuditRepository};

/// Repository port for role, permission, and assignment storage.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists active roles assigned to an employee, highest priority first.
    ///
    /// Filters on the assignment and role active flags only; a dated
    /// assignment expiry does not exclude the row.
    async fn list_active_roles_for_employee(
        &self,
        employee_id: PrincipalId,
    ) -> AppResult<Vec<Role>>;

    /// Lists permission grants attached to any of the given roles.
    ///
    /// Grants repeated across roles may appear more than once.
    async fn list_permissions_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<PermissionGrant>>;

    /// Lists every active role in the system.
    async fn list_active_roles(&self) -> AppResult<Vec<Role>>;

    /// Lists every permission defined in the system.
    async fn list_all_permissions(&self) -> AppResult<Vec<PermissionGrant>>;

    /// Lists the permission grants of one role.
    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>>;

    /// Finds an active role by its unique code.
    async fn find_active_role_by_code(&self, code: &str) -> AppResult<Option<Role>>;

    /// Finds a role by its unique code regardless of activation state.
    async fn find_role_by_code(&self, code: &str) -> AppResult<Option<Role>>;

    /// Inserts or updates an assignment row keyed on `(employee, role)`,
    /// forcing it back to active.
    async fn upsert_role_assignment(&self, assignment: &RoleAssignment) -> AppResult<()>;

    /// Deactivates an assignment row. A missing or already-inactive row is
    /// not an error.
    async fn deactivate_role_assignment(
        &self,
        employee_id: PrincipalId,
        role_id: RoleId,
    ) -> AppResult<()>;
}

/// Repository port for the persisted permission snapshot, read and replaced
/// as a whole.
#[async_trait]
pub trait PermissionCacheRepository: Send + Sync {
    /// Finds the employee's snapshot when one exists and has not expired at
    /// `now`.
    async fn find_current(
        &self,
        employee_id: PrincipalId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PermissionSnapshot>>;

    /// Inserts or overwrites the employee's snapshot.
    async fn replace(&self, snapshot: &PermissionSnapshot) -> AppResult<()>;

    /// Deletes the employee's snapshot so the next read recomputes.
    async fn invalidate(&self, employee_id: PrincipalId) -> AppResult<()>;
}

/// Port answering which population a principal id belongs to.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Returns whether the id names a system account.
    async fn is_system_account(&self, principal_id: PrincipalId) -> AppResult<bool>;

    /// Returns whether the id names an employee.
    async fn is_employee(&self, principal_id: PrincipalId) -> AppResult<bool>;
}

/// Application service resolving effective permissions and administering
/// role assignments.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    cache_repository: Arc<dyn PermissionCacheRepository>,
    directory: Arc<dyn PrincipalDirectory>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AuthorizationService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        cache_repository: Arc<dyn PermissionCacheRepository>,
        directory: Arc<dyn PrincipalDirectory>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            cache_repository,
            directory,
            audit_repository,
        }
    }

    /// Returns the principal's effective permission snapshot.
    ///
    /// Storage failures surface as one opaque internal error; no partial or
    /// stale data is returned.
    pub async fn effective_permissions(
        &self,
        principal_id: PrincipalId,
    ) -> AppResult<PermissionSnapshot> {
        self.resolve_snapshot(principal_id).await.map_err(|error| {
            warn!(%principal_id, %error, "failed to resolve permission snapshot");
            AppError::Internal("failed to load permission data".to_owned())
        })
    }

    /// Recomputes and persists the employee's snapshot, bypassing any cached
    /// row.
    pub async fn refresh_permission_cache(
        &self,
        employee_id: PrincipalId,
    ) -> AppResult<PermissionSnapshot> {
        self.recompute_snapshot(employee_id).await.map_err(|error| {
            warn!(%employee_id, %error, "failed to refresh permission snapshot");
            AppError::Internal("failed to load permission data".to_owned())
        })
    }

    /// Returns whether the principal holds a permission satisfying the
    /// request. Denies on any internal failure.
    pub async fn has_permission(
        &self,
        principal_id: PrincipalId,
        resource: &str,
        action: &str,
        scope: Option<PermissionScope>,
    ) -> bool {
        match self.resolve_snapshot(principal_id).await {
            Ok(snapshot) => snapshot.grants(resource, action, scope),
            Err(error) => {
                warn!(%principal_id, resource, action, %error, "permission check failed, denying");
                false
            }
        }
    }

    /// Returns whether the principal holds the role. System accounts hold
    /// every role. Denies on any internal failure.
    pub async fn has_role(&self, principal_id: PrincipalId, role_code: &str) -> bool {
        match self.try_has_role(principal_id, role_code).await {
            Ok(held) => held,
            Err(error) => {
                warn!(%principal_id, role_code, %error, "role check failed, denying");
                false
            }
        }
    }

    async fn try_has_role(&self, principal_id: PrincipalId, role_code: &str) -> AppResult<bool> {
        if self.directory.is_system_account(principal_id).await? {
            return Ok(true);
        }
        let snapshot = self.resolve_snapshot(principal_id).await?;
        Ok(snapshot.has_role_code(role_code))
    }

    /// Returns whether the principal may act on a concrete resource instance,
    /// honoring grant scopes. Denies on any internal failure.
    pub async fn can_access_resource(
        &self,
        principal_id: PrincipalId,
        resource: &str,
        action: &str,
        resource_owner_id: Option<PrincipalId>,
        resource_department_id: Option<DepartmentId>,
    ) -> bool {
        match self.resolve_snapshot(principal_id).await {
            Ok(snapshot) => snapshot
                .permissions
                .iter()
                .filter(|grant| grant.resource == resource && grant.action == action)
                .any(|grant| match grant.scope {
                    PermissionScope::All => true,
                    PermissionScope::Own => resource_owner_id == Some(principal_id),
                    // TODO: compare the supplied department against the
                    // principal's own department once employee department
                    // data is reachable from this service.
                    PermissionScope::Department => resource_department_id.is_some(),
                }),
            Err(error) => {
                warn!(%principal_id, resource, action, %error, "resource access check failed, denying");
                false
            }
        }
    }

    /// Returns the principal's most senior role, or `None` when the role set
    /// is empty or cannot be resolved.
    pub async fn highest_role(&self, principal_id: PrincipalId) -> Option<Role> {
        match self.resolve_snapshot(principal_id).await {
            Ok(snapshot) => snapshot.highest_role().cloned(),
            Err(error) => {
                warn!(%principal_id, %error, "highest role lookup failed");
                None
            }
        }
    }

    /// Grants a role to an employee, reactivating a previously revoked
    /// assignment if one exists, and invalidates the employee's snapshot.
    pub async fn assign_role(
        &self,
        employee_id: PrincipalId,
        role_code: &str,
        assigned_by: PrincipalId,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let role = self
            .repository
            .find_active_role_by_code(role_code)
            .await
            .map_err(assignment_failed)?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_code}'")))?;

        let actor_employee_id = self
            .directory
            .is_employee(assigned_by)
            .await
            .map_err(assignment_failed)?
            .then_some(assigned_by);

        let assignment = RoleAssignment {
            employee_id,
            role_id: role.id,
            assigned_by: actor_employee_id,
            assigned_at: Utc::now(),
            expires_at,
            is_active: true,
        };
        self.repository
            .upsert_role_assignment(&assignment)
            .await
            .map_err(assignment_failed)?;

        self.append_audit(AuditEvent {
            actor_employee_id,
            action: AuditAction::GrantRole,
            target_employee_id: Some(employee_id),
            target_role_id: Some(role.id),
            detail: Some(json!({
                "role_code": role_code,
                "expires_at": expires_at.map(|instant| instant.to_rfc3339()),
            })),
        })
        .await;

        self.cache_repository
            .invalidate(employee_id)
            .await
            .map_err(assignment_failed)
    }

    /// Revokes a role from an employee and invalidates the employee's
    /// snapshot. Revoking a role the employee does not hold is a no-op.
    pub async fn revoke_role(
        &self,
        employee_id: PrincipalId,
        role_code: &str,
        revoked_by: PrincipalId,
    ) -> AppResult<()> {
        let role = self
            .repository
            .find_role_by_code(role_code)
            .await
            .map_err(revocation_failed)?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_code}'")))?;

        self.repository
            .deactivate_role_assignment(employee_id, role.id)
            .await
            .map_err(revocation_failed)?;

        let actor_employee_id = match self.directory.is_employee(revoked_by).await {
            Ok(true) => Some(revoked_by),
            Ok(false) | Err(_) => None,
        };
        self.append_audit(AuditEvent {
            actor_employee_id,
            action: AuditAction::RevokeRole,
            target_employee_id: Some(employee_id),
            target_role_id: Some(role.id),
            detail: Some(json!({ "role_code": role_code })),
        })
        .await;

        self.cache_repository
            .invalidate(employee_id)
            .await
            .map_err(revocation_failed)
    }

    /// Lists every active role in the system.
    pub async fn all_roles(&self) -> AppResult<Vec<Role>> {
        self.repository.list_active_roles().await
    }

    /// Lists the permission grants of one role.
    pub async fn role_permissions(&self, role_id: RoleId) -> AppResult<Vec<PermissionGrant>> {
        self.repository.list_role_permissions(role_id).await
    }

    async fn resolve_snapshot(&self, principal_id: PrincipalId) -> AppResult<PermissionSnapshot> {
        if self.directory.is_system_account(principal_id).await? {
            return self.system_account_snapshot(principal_id).await;
        }

        let now = Utc::now();
        if let Some(snapshot) = self.cache_repository.find_current(principal_id, now).await? {
            return Ok(snapshot);
        }

        self.recompute_snapshot(principal_id).await
    }

    /// Builds the virtual snapshot for a system account. Never persisted.
    async fn system_account_snapshot(
        &self,
        principal_id: PrincipalId,
    ) -> AppResult<PermissionSnapshot> {
        let permissions = self.repository.list_all_permissions().await?;
        let roles = self.repository.list_active_roles().await?;
        let calculated_at = Utc::now();
        Ok(PermissionSnapshot {
            employee_id: principal_id,
            permissions,
            roles,
            calculated_at,
            expires_at: calculated_at + Duration::hours(24),
        })
    }

    async fn recompute_snapshot(
        &self,
        employee_id: PrincipalId,
    ) -> AppResult<PermissionSnapshot> {
        let roles = self
            .repository
            .list_active_roles_for_employee(employee_id)
            .await?;
        let role_ids: Vec<RoleId> = roles.iter().map(|role| role.id).collect();
        let permissions = if role_ids.is_empty() {
            Vec::new()
        } else {
            self.repository.list_permissions_for_roles(&role_ids).await?
        };

        let calculated_at = Utc::now();
        let snapshot = PermissionSnapshot {
            employee_id,
            permissions,
            roles,
            calculated_at,
            expires_at: calculated_at + Duration::hours(1),
        };
        self.cache_repository.replace(&snapshot).await?;
        Ok(snapshot)
    }

    async fn append_audit(&self, event: AuditEvent) {
        if let Err(error) = self.audit_repository.append_event(event).await {
            warn!(%error, "failed to append audit event");
        }
    }
}

fn assignment_failed(error: AppError) -> AppError {
    warn!(%error, "role assignment failed");
    AppError::Internal("role assignment failed".to_owned())
}

fn revocation_failed(error: AppError) -> AppError {
    warn!(%error, "role revocation failed");
    AppError::Internal("role revocation failed".to_owned())
}
