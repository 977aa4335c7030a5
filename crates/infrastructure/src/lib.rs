//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod postgres_audit_repository;
mod postgres_authorization_repository;
mod postgres_permission_cache_repository;
mod postgres_principal_directory;
mod postgres_project_accounting_repository;

pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_permission_cache_repository::PostgresPermissionCacheRepository;
pub use postgres_principal_directory::PostgresPrincipalDirectory;
pub use postgres_project_accounting_repository::PostgresProjectAccountingRepository;
