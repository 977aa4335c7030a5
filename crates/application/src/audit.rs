use async_trait::async_trait;
use serde_json::Value;

use tessera_core::{AppResult, PrincipalId, RoleId};
use tessera_domain::AuditAction;

/// One append-only audit record emitted by role administration.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    /// Acting employee; `None` when the actor is a system account.
    pub actor_employee_id: Option<PrincipalId>,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Employee the action targeted.
    pub target_employee_id: Option<PrincipalId>,
    /// Role the action targeted.
    pub target_role_id: Option<RoleId>,
    /// Opaque structured payload.
    pub detail: Option<Value>,
}

/// Port for the append-only audit sink.
///
/// Writes are best-effort: callers log and discard failures rather than
/// aborting the operation that produced the event.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
