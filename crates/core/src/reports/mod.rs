//! Canned report builders. Each is a pure function from an invoice snapshot
//! (plus a reference date) to a serializable payload; the HTTP layer ships
//! the payload as the response body without reshaping it.

pub mod customers;
pub mod disputes;
pub mod overview;
pub mod performance;
pub mod ptp;
pub mod regions;

pub use customers::{customer_report, CustomerAccount, CustomerReport};
pub use disputes::{dispute_report, DisputeMonthPoint, DisputeReport};
pub use overview::{overview, Overview};
pub use performance::{performance_report, CollectorPerformance, PerformanceReport};
pub use ptp::{ptp_report, PtpEntry, PtpReport};
pub use regions::{region_report, RegionReport, RegionSummary};
