//! Domain types and rules for the Tessera authorization and
//! project-accounting core.

#![forbid(unsafe_code)]

/// Roles, permission grants, and resolved permission snapshots.
pub mod authorization;
/// Research project, budget period, member, and evidence records.
pub mod project;
/// Accounting consistency checks and their shared primitives.
pub mod validation;

pub use authorization::{
    AuditAction, PermissionGrant, PermissionScope, PermissionSnapshot, Role, RoleAssignment,
};
pub use project::{EvidenceItem, Project, ProjectBudget, ProjectMember};
pub use validation::{ValidationReason, ValidationResult, ValidationSummary};
