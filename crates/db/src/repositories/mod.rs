//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return `sqlx::Error` on
//! storage failure. Transaction-scoped flows (supply record submission)
//! open and commit their transaction inside a single repository method so
//! no intermediate state is ever observable.

pub mod audit_log_repo;
pub mod purchase_order_repo;
pub mod share_link_repo;
pub mod supply_record_repo;

pub use audit_log_repo::AuditLogRepo;
pub use purchase_order_repo::PurchaseOrderRepo;
pub use share_link_repo::ShareLinkRepo;
pub use supply_record_repo::SupplyRecordRepo;
