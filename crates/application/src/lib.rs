//! Application services and ports.

#![forbid(unsafe_code)]

mod audit;
mod authorization_service;
mod project_validation_service;

pub use audit::{AuditEvent, AuditRepository};
pub use authorization_service::{
    AuthorizationRepository, AuthorizationService, PermissionCacheRepository, PrincipalDirectory,
};
pub use project_validation_service::{
    EnvelopeError, MemberCheck, PeriodCheck, ProjectAccountingRepository, ProjectValidationReport,
    ProjectValidationService, ResponseEnvelope, ValidationPolicy,
};
