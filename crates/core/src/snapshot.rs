//! Boundary validation for loosely-typed invoice records.
//!
//! Storage collaborators hand the core JSON-shaped records; each record is
//! validated exactly once here. A malformed record is skipped and counted as
//! a data-quality warning, never a fatal error, so one bad row cannot abort
//! a whole report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::invoice::{Invoice, InvoiceId, InvoiceStatus, PromiseStatus, PromiseToPay};
use crate::domain::user::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordDefect {
    MissingField { field: &'static str },
    MalformedAmount { value: String },
    MalformedDate { field: &'static str, value: String },
    UnknownStatus { value: String },
    IssueAfterDue { issue_date: NaiveDate, due_date: NaiveDate },
}

impl RecordDefect {
    fn reason(&self) -> String {
        match self {
            Self::MissingField { field } => format!("missing required field `{field}`"),
            Self::MalformedAmount { value } => {
                format!("amount `{value}` is not a finite non-negative number")
            }
            Self::MalformedDate { field, value } => {
                format!("field `{field}` holds unparseable date `{value}`")
            }
            Self::UnknownStatus { value } => format!("unknown invoice status `{value}`"),
            Self::IssueAfterDue { issue_date, due_date } => {
                format!("issue date {issue_date} is after due date {due_date}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub defect: RecordDefect,
}

/// Per-snapshot data-quality counters, surfaced to callers alongside every
/// report so skipped rows stay visible instead of silently vanishing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub accepted: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl DataQuality {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// An immutable point-in-time view of the invoice set. The core never
/// fetches or mutates storage; consistency of the read is the storage
/// collaborator's problem.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvoiceSnapshot {
    pub invoices: Vec<Invoice>,
    pub quality: DataQuality,
}

impl InvoiceSnapshot {
    pub fn new(invoices: Vec<Invoice>) -> Self {
        let accepted = invoices.len();
        Self { invoices, quality: DataQuality { accepted, skipped: Vec::new() } }
    }

    pub fn from_json_records(records: &[Value]) -> Self {
        let mut invoices = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match parse_record(record) {
                Ok(invoice) => invoices.push(invoice),
                Err(defect) => {
                    warn!(
                        event_name = "snapshot.record_skipped",
                        record_index = index,
                        reason = %defect.reason(),
                        "invoice record skipped during snapshot validation"
                    );
                    skipped.push(SkippedRecord { index, defect });
                }
            }
        }

        let accepted = invoices.len();
        Self { invoices, quality: DataQuality { accepted, skipped } }
    }
}

fn parse_record(record: &Value) -> Result<Invoice, RecordDefect> {
    let id = require_string(record, "id")?;
    let customer_name = require_string(record, "customerName")?;
    let amount = parse_amount(record)?;
    let issue_date = parse_date(record, "issueDate")?;
    let due_date = parse_date(record, "dueDate")?;
    let status = parse_status(record)?;

    if issue_date > due_date {
        return Err(RecordDefect::IssueAfterDue { issue_date, due_date });
    }

    let assigned_to = record
        .get("assignedTo")
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(|value| UserId(value.to_owned()));
    let region = record
        .get("region")
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned);
    let promise = parse_promise(record);

    Ok(Invoice {
        id: InvoiceId(id),
        amount,
        issue_date,
        due_date,
        status,
        assigned_to,
        region,
        customer_name,
        promise,
    })
}

fn require_string(record: &Value, field: &'static str) -> Result<String, RecordDefect> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
        .ok_or(RecordDefect::MissingField { field })
}

fn parse_amount(record: &Value) -> Result<Decimal, RecordDefect> {
    let raw = record.get("amount").ok_or(RecordDefect::MissingField { field: "amount" })?;

    // The source parsed amounts with an implicit float upcast; here anything
    // that is not a finite non-negative number is rejected and counted.
    let parsed = match raw {
        Value::Number(number) => number.to_string().parse::<Decimal>().ok(),
        Value::String(text) => text.trim().parse::<Decimal>().ok(),
        _ => None,
    };

    match parsed {
        Some(amount) if amount >= Decimal::ZERO => Ok(amount),
        _ => Err(RecordDefect::MalformedAmount { value: raw.to_string() }),
    }
}

fn parse_date(record: &Value, field: &'static str) -> Result<NaiveDate, RecordDefect> {
    let raw = record
        .get(field)
        .and_then(Value::as_str)
        .ok_or(RecordDefect::MissingField { field })?;

    // Accept plain dates and RFC 3339 timestamps; the calendar date is all
    // aging ever needs.
    raw.parse::<NaiveDate>()
        .or_else(|_| {
            raw.parse::<chrono::DateTime<chrono::Utc>>().map(|instant| instant.date_naive())
        })
        .map_err(|_| RecordDefect::MalformedDate { field, value: raw.to_owned() })
}

fn parse_status(record: &Value) -> Result<InvoiceStatus, RecordDefect> {
    let raw = record
        .get("status")
        .and_then(Value::as_str)
        .ok_or(RecordDefect::MissingField { field: "status" })?;

    raw.parse::<InvoiceStatus>()
        .map_err(|_| RecordDefect::UnknownStatus { value: raw.to_owned() })
}

fn parse_promise(record: &Value) -> Option<PromiseToPay> {
    let promise = record.get("promise")?;
    let promised_on =
        promise.get("promisedOn").and_then(Value::as_str)?.parse::<NaiveDate>().ok()?;
    let status = match promise.get("status").and_then(Value::as_str)? {
        "pending" => PromiseStatus::Pending,
        "kept" => PromiseStatus::Kept,
        "broken" => PromiseStatus::Broken,
        _ => return None,
    };

    Some(PromiseToPay { promised_on, status })
}
