use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aging::metrics::percentage;
use crate::domain::invoice::{Invoice, InvoiceStatus};
use crate::snapshot::InvoiceSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeMonthPoint {
    /// `YYYY-MM`, grouped by due-date month.
    pub month: String,
    pub amount: Decimal,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeReport {
    pub disputed_count: usize,
    pub disputed_amount: Decimal,
    pub share_of_outstanding_pct: Decimal,
    pub monthly_trend: Vec<DisputeMonthPoint>,
}

pub fn dispute_report(snapshot: &InvoiceSnapshot, as_of: NaiveDate, months: u32) -> DisputeReport {
    let disputed: Vec<&Invoice> = snapshot
        .invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Disputed)
        .collect();

    let disputed_amount: Decimal = disputed.iter().map(|invoice| invoice.amount).sum();
    let outstanding: Decimal = snapshot
        .invoices
        .iter()
        .filter(|invoice| invoice.is_outstanding())
        .map(|invoice| invoice.amount)
        .sum();

    let mut monthly_trend = Vec::with_capacity(months as usize);
    for offset in (0..months).rev() {
        let (year, month) = month_back(as_of, offset);
        let mut point = DisputeMonthPoint {
            month: format!("{year:04}-{month:02}"),
            amount: Decimal::ZERO,
            count: 0,
        };
        for invoice in &disputed {
            if invoice.due_date.year() == year && invoice.due_date.month() == month {
                point.amount += invoice.amount;
                point.count += 1;
            }
        }
        monthly_trend.push(point);
    }

    DisputeReport {
        disputed_count: disputed.len(),
        disputed_amount,
        share_of_outstanding_pct: percentage(disputed_amount, outstanding),
        monthly_trend,
    }
}

/// Calendar month `offset` months before the month of `as_of`.
fn month_back(as_of: NaiveDate, offset: u32) -> (i32, u32) {
    let zero_based = as_of.year() * 12 + as_of.month0() as i32 - offset as i32;
    (zero_based.div_euclid(12), zero_based.rem_euclid(12) as u32 + 1)
}
