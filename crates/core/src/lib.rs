pub mod aging;
pub mod authz;
pub mod config;
pub mod domain;
pub mod errors;
pub mod reports;
pub mod session;
pub mod snapshot;

pub use aging::metrics::{collection_rate, summary, top_overdue, ArSummary, OverdueInvoice};
pub use aging::trend::{weekly_trend, WeeklyTrendPoint};
pub use aging::{schedule, AgingBucket, AgingSchedule, BucketTotals};
pub use authz::nav::{navigation_for, NavItem};
pub use authz::{AccessDecision, AccessDenial, RouteAccessPolicy};
pub use domain::invoice::{Invoice, InvoiceId, InvoiceStatus, PromiseStatus, PromiseToPay};
pub use domain::user::{Role, UserId, ALL_ROLES};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use session::SessionCache;
pub use snapshot::{DataQuality, InvoiceSnapshot, RecordDefect, SkippedRecord};
