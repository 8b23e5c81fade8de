use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aging::metrics::percentage;
use crate::domain::invoice::{InvoiceId, PromiseStatus};
use crate::domain::user::UserId;
use crate::snapshot::InvoiceSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PtpEntry {
    pub invoice_id: InvoiceId,
    pub customer_name: String,
    pub amount: Decimal,
    pub promised_on: NaiveDate,
    pub status: PromiseStatus,
    pub collector: Option<UserId>,
}

/// Promise-to-pay rollup: status distribution, fulfillment rate over the
/// promises that have resolved, and the promise list sorted by date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PtpReport {
    pub pending_count: u32,
    pub kept_count: u32,
    pub broken_count: u32,
    pub pending_amount: Decimal,
    pub kept_amount: Decimal,
    pub broken_amount: Decimal,
    pub fulfillment_rate_pct: Decimal,
    pub promises: Vec<PtpEntry>,
}

pub fn ptp_report(snapshot: &InvoiceSnapshot) -> PtpReport {
    let mut report = PtpReport {
        pending_count: 0,
        kept_count: 0,
        broken_count: 0,
        pending_amount: Decimal::ZERO,
        kept_amount: Decimal::ZERO,
        broken_amount: Decimal::ZERO,
        fulfillment_rate_pct: Decimal::ZERO,
        promises: Vec::new(),
    };

    for invoice in &snapshot.invoices {
        let Some(promise) = &invoice.promise else { continue };

        match promise.status {
            PromiseStatus::Pending => {
                report.pending_count += 1;
                report.pending_amount += invoice.amount;
            }
            PromiseStatus::Kept => {
                report.kept_count += 1;
                report.kept_amount += invoice.amount;
            }
            PromiseStatus::Broken => {
                report.broken_count += 1;
                report.broken_amount += invoice.amount;
            }
        }

        report.promises.push(PtpEntry {
            invoice_id: invoice.id.clone(),
            customer_name: invoice.customer_name.clone(),
            amount: invoice.amount,
            promised_on: promise.promised_on,
            status: promise.status,
            collector: invoice.assigned_to.clone(),
        });
    }

    report.promises.sort_by(|a, b| {
        a.promised_on.cmp(&b.promised_on).then_with(|| a.invoice_id.cmp(&b.invoice_id))
    });

    let resolved = Decimal::from(report.kept_count + report.broken_count);
    report.fulfillment_rate_pct = percentage(Decimal::from(report.kept_count), resolved);

    report
}
