use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

/// Invoice workflow status, set by collaborators outside the core. Mutually
/// exclusive; the aging engine only ever distinguishes paid from unpaid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Open,
    Paid,
    Overdue,
    Disputed,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Disputed => "disputed",
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "disputed" => Ok(Self::Disputed),
            other => Err(DomainError::UnknownInvoiceStatus { status: other.to_owned() }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromiseStatus {
    Pending,
    Kept,
    Broken,
}

/// A collector-recorded promise to pay, attached to an invoice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromiseToPay {
    pub promised_on: NaiveDate,
    pub status: PromiseStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub amount: Decimal,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub assigned_to: Option<UserId>,
    pub region: Option<String>,
    pub customer_name: String,
    pub promise: Option<PromiseToPay>,
}

impl Invoice {
    /// Whole days elapsed past the due date at `as_of`. Negative before the
    /// due date; callers fold non-positive values into the `current` bucket.
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.due_date).num_days()
    }

    pub fn is_outstanding(&self) -> bool {
        self.status != InvoiceStatus::Paid
    }

    /// Computed overdue predicate used for ranking: unpaid and past due.
    /// The persisted `Overdue` label is a workflow artifact and is never
    /// consulted here.
    pub fn is_past_due(&self, as_of: NaiveDate) -> bool {
        self.is_outstanding() && self.days_overdue(as_of) > 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{Invoice, InvoiceId, InvoiceStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(due: NaiveDate, status: InvoiceStatus) -> Invoice {
        Invoice {
            id: InvoiceId("INV-1".to_string()),
            amount: Decimal::new(10_000, 2),
            issue_date: due - chrono::Days::new(30),
            due_date: due,
            status,
            assigned_to: None,
            region: None,
            customer_name: "Acme Inc".to_string(),
            promise: None,
        }
    }

    #[test]
    fn days_overdue_is_negative_before_due_date() {
        let inv = invoice(date(2025, 6, 10), InvoiceStatus::Open);
        assert_eq!(inv.days_overdue(date(2025, 6, 5)), -5);
        assert_eq!(inv.days_overdue(date(2025, 6, 10)), 0);
        assert_eq!(inv.days_overdue(date(2025, 6, 15)), 5);
    }

    #[test]
    fn past_due_ignores_the_overdue_label() {
        let not_yet_due = invoice(date(2025, 6, 10), InvoiceStatus::Overdue);
        assert!(!not_yet_due.is_past_due(date(2025, 6, 1)));

        let open_but_late = invoice(date(2025, 6, 10), InvoiceStatus::Open);
        assert!(open_but_late.is_past_due(date(2025, 6, 20)));
    }

    #[test]
    fn paid_invoices_are_never_past_due() {
        let paid = invoice(date(2025, 1, 1), InvoiceStatus::Paid);
        assert!(!paid.is_past_due(date(2025, 12, 31)));
    }

    #[test]
    fn status_parse_fails_closed() {
        assert!("written-off".parse::<InvoiceStatus>().is_err());
        assert_eq!(" Paid ".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Paid);
    }
}
