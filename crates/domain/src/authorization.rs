use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tessera_core::{AppError, PrincipalId, RoleId};

/// Breadth of a permission grant.
///
/// A broader scope always satisfies a request for an equal-or-narrower one:
/// `All` covers everything, `Department` additionally covers `Own`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// Grant limited to resources the principal owns.
    Own,
    /// Grant covering the principal's department.
    Department,
    /// Unrestricted grant.
    All,
}

impl PermissionScope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Department => "department",
            Self::All => "all",
        }
    }

    /// Returns whether a grant at this scope satisfies a requested scope.
    ///
    /// An unspecified requested scope is satisfied by any grant.
    #[must_use]
    pub fn satisfies(&self, requested: Option<PermissionScope>) -> bool {
        match (self, requested) {
            (_, None) | (Self::All, _) => true,
            (Self::Department, Some(Self::Department | Self::Own)) => true,
            (scope, Some(requested)) => *scope == requested,
        }
    }
}

impl FromStr for PermissionScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "own" => Ok(Self::Own),
            "department" => Ok(Self::Department),
            "all" => Ok(Self::All),
            _ => Err(AppError::Validation(format!(
                "unknown permission scope '{value}'"
            ))),
        }
    }
}

/// One permission attached to a role.
///
/// Identity is the `(resource, action, scope)` tuple; duplicates across roles
/// are tolerated since checks only need existence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Stable symbolic code.
    pub code: String,
    /// Resource the grant applies to.
    pub resource: String,
    /// Action the grant allows.
    pub action: String,
    /// Breadth of the grant.
    pub scope: PermissionScope,
}

impl PermissionGrant {
    /// Returns whether this grant satisfies a `(resource, action, scope)` request.
    #[must_use]
    pub fn matches(&self, resource: &str, action: &str, scope: Option<PermissionScope>) -> bool {
        self.resource == resource && self.action == action && self.scope.satisfies(scope)
    }
}

/// Role definition. Immutable reference data apart from the activation flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique symbolic name.
    pub code: String,
    /// Role name.
    pub name: String,
    /// Display name in the deployment locale.
    pub localized_name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Seniority ranking, higher is more senior.
    pub priority: i32,
    /// Optional parent role for hierarchy modeling; unused during resolution.
    pub parent_role_id: Option<RoleId>,
    /// Activation flag.
    pub is_active: bool,
}

/// Link between an employee and a role.
///
/// Upsert semantics are keyed on `(employee_id, role_id)`: re-assigning an
/// existing pair updates the row and forces it back to active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Employee holding the role.
    pub employee_id: PrincipalId,
    /// Assigned role.
    pub role_id: RoleId,
    /// Granting employee, when the grantor was not a system account.
    pub assigned_by: Option<PrincipalId>,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Optional assignment expiry. Stored but not consulted during
    /// resolution; revocation is the supported path for removing access.
    pub expires_at: Option<DateTime<Utc>>,
    /// Active flag toggled by assign/revoke.
    pub is_active: bool,
}

/// Resolved permission and role set for one employee, with a cache lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    /// Employee the snapshot belongs to.
    pub employee_id: PrincipalId,
    /// Union of permissions across the employee's active roles.
    pub permissions: Vec<PermissionGrant>,
    /// Active roles held by the employee.
    pub roles: Vec<Role>,
    /// Computation timestamp.
    pub calculated_at: DateTime<Utc>,
    /// Expiry after which the snapshot must be recomputed.
    pub expires_at: DateTime<Utc>,
}

impl PermissionSnapshot {
    /// Returns whether the snapshot has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Returns whether any held permission satisfies the request.
    #[must_use]
    pub fn grants(&self, resource: &str, action: &str, scope: Option<PermissionScope>) -> bool {
        self.permissions
            .iter()
            .any(|grant| grant.matches(resource, action, scope))
    }

    /// Returns whether the snapshot contains a role with the given code.
    #[must_use]
    pub fn has_role_code(&self, code: &str) -> bool {
        self.roles.iter().any(|role| role.code == code)
    }

    /// Returns the most senior role, or `None` when no roles are held.
    ///
    /// On equal priority the first role encountered wins; priorities are
    /// unique in practice.
    #[must_use]
    pub fn highest_role(&self) -> Option<&Role> {
        self.roles.iter().fold(None, |best, role| match best {
            Some(current) if role.priority <= current.priority => Some(current),
            _ => Some(role),
        })
    }
}

/// Stable audit actions emitted by role administration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is granted to an employee.
    GrantRole,
    /// Emitted when a role is revoked from an employee.
    RevokeRole,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrantRole => "grant_role",
            Self::RevokeRole => "revoke_role",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, Utc};
    use tessera_core::{PrincipalId, RoleId};

    use super::{PermissionGrant, PermissionScope, PermissionSnapshot, Role};

    fn grant(resource: &str, action: &str, scope: PermissionScope) -> PermissionGrant {
        PermissionGrant {
            code: format!("{resource}.{action}.{}", scope.as_str()),
            resource: resource.to_owned(),
            action: action.to_owned(),
            scope,
        }
    }

    fn role(code: &str, priority: i32) -> Role {
        Role {
            id: RoleId::new(),
            code: code.to_owned(),
            name: code.to_owned(),
            localized_name: code.to_owned(),
            description: None,
            priority,
            parent_role_id: None,
            is_active: true,
        }
    }

    fn snapshot(permissions: Vec<PermissionGrant>, roles: Vec<Role>) -> PermissionSnapshot {
        let now = Utc::now();
        PermissionSnapshot {
            employee_id: PrincipalId::new(),
            permissions,
            roles,
            calculated_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn all_scope_satisfies_every_request() {
        let snapshot = snapshot(vec![grant("employee", "read", PermissionScope::All)], vec![]);
        for requested in [
            None,
            Some(PermissionScope::Own),
            Some(PermissionScope::Department),
            Some(PermissionScope::All),
        ] {
            assert!(snapshot.grants("employee", "read", requested));
        }
    }

    #[test]
    fn department_scope_covers_own_but_not_all() {
        let held = PermissionScope::Department;
        assert!(held.satisfies(Some(PermissionScope::Own)));
        assert!(held.satisfies(Some(PermissionScope::Department)));
        assert!(!held.satisfies(Some(PermissionScope::All)));
    }

    #[test]
    fn own_scope_does_not_cover_broader_requests() {
        let held = PermissionScope::Own;
        assert!(held.satisfies(None));
        assert!(held.satisfies(Some(PermissionScope::Own)));
        assert!(!held.satisfies(Some(PermissionScope::Department)));
        assert!(!held.satisfies(Some(PermissionScope::All)));
    }

    #[test]
    fn grant_requires_matching_resource_and_action() {
        let snapshot = snapshot(vec![grant("employee", "read", PermissionScope::All)], vec![]);
        assert!(!snapshot.grants("employee", "write", None));
        assert!(!snapshot.grants("payroll", "read", None));
    }

    #[test]
    fn highest_role_picks_maximum_priority() {
        let snapshot = snapshot(
            vec![],
            vec![role("staff", 10), role("director", 80), role("lead", 40)],
        );
        let highest = snapshot.highest_role();
        assert_eq!(highest.map(|role| role.code.as_str()), Some("director"));
    }

    #[test]
    fn highest_role_keeps_first_on_equal_priority() {
        let snapshot = snapshot(vec![], vec![role("first", 50), role("second", 50)]);
        assert_eq!(
            snapshot.highest_role().map(|role| role.code.as_str()),
            Some("first")
        );
    }

    #[test]
    fn highest_role_is_none_for_empty_set() {
        let snapshot = snapshot(vec![], vec![]);
        assert!(snapshot.highest_role().is_none());
    }

    #[test]
    fn scope_round_trips_storage_value() {
        for scope in [
            PermissionScope::Own,
            PermissionScope::Department,
            PermissionScope::All,
        ] {
            let restored = PermissionScope::from_str(scope.as_str());
            assert_eq!(restored.ok(), Some(scope));
        }
    }

    #[test]
    fn unknown_scope_is_rejected() {
        assert!(PermissionScope::from_str("tenant").is_err());
    }
}
