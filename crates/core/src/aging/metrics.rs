use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::invoice::{Invoice, InvoiceId, InvoiceStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueInvoice {
    pub id: InvoiceId,
    pub customer_name: String,
    pub amount: Decimal,
    pub days_overdue: i64,
}

/// Dashboard KPI rollup over one snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArSummary {
    pub total_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub overdue_amount: Decimal,
    pub overdue_pct: Decimal,
    pub collection_rate_pct: Decimal,
    pub invoice_count: usize,
}

/// Percentage `numerator / denominator * 100`, rounded to two decimals.
/// Exactly zero when the denominator is zero so empty sets never produce
/// NaN or infinity downstream.
pub fn percentage(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    (numerator / denominator * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Paid share of the whole set, in `[0, 100]`.
pub fn collection_rate(invoices: &[Invoice]) -> Decimal {
    let total: Decimal = invoices.iter().map(|invoice| invoice.amount).sum();
    let paid: Decimal = invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Paid)
        .map(|invoice| invoice.amount)
        .sum();
    percentage(paid, total)
}

/// The `n` largest past-due invoices, by amount descending with id as the
/// deterministic tie-break. Uses the computed past-due predicate only.
pub fn top_overdue(invoices: &[Invoice], as_of: NaiveDate, n: usize) -> Vec<OverdueInvoice> {
    let mut ranked: Vec<&Invoice> =
        invoices.iter().filter(|invoice| invoice.is_past_due(as_of)).collect();
    ranked.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.id.cmp(&b.id)));

    ranked
        .into_iter()
        .take(n)
        .map(|invoice| OverdueInvoice {
            id: invoice.id.clone(),
            customer_name: invoice.customer_name.clone(),
            amount: invoice.amount,
            days_overdue: invoice.days_overdue(as_of),
        })
        .collect()
}

pub fn summary(invoices: &[Invoice], as_of: NaiveDate) -> ArSummary {
    let total_amount: Decimal = invoices.iter().map(|invoice| invoice.amount).sum();
    let outstanding_amount: Decimal = invoices
        .iter()
        .filter(|invoice| invoice.is_outstanding())
        .map(|invoice| invoice.amount)
        .sum();
    let overdue_amount: Decimal = invoices
        .iter()
        .filter(|invoice| invoice.is_past_due(as_of))
        .map(|invoice| invoice.amount)
        .sum();

    ArSummary {
        total_amount,
        outstanding_amount,
        overdue_amount,
        overdue_pct: percentage(overdue_amount, outstanding_amount),
        collection_rate_pct: collection_rate(invoices),
        invoice_count: invoices.len(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use rust_decimal::Decimal;

    use super::{collection_rate, summary, top_overdue};
    use crate::domain::invoice::{Invoice, InvoiceId, InvoiceStatus};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn invoice(id: &str, amount: i64, days_overdue: i64, status: InvoiceStatus) -> Invoice {
        let due_date = if days_overdue >= 0 {
            as_of() - Days::new(days_overdue as u64)
        } else {
            as_of() + Days::new((-days_overdue) as u64)
        };
        Invoice {
            id: InvoiceId(id.to_string()),
            amount: Decimal::from(amount),
            issue_date: due_date - Days::new(30),
            due_date,
            status,
            assigned_to: None,
            region: None,
            customer_name: "Acme Inc".to_string(),
            promise: None,
        }
    }

    #[test]
    fn collection_rate_matches_spec_example() {
        let invoices = vec![
            invoice("INV-1", 100, 5, InvoiceStatus::Open),
            invoice("INV-2", 200, 45, InvoiceStatus::Overdue),
            invoice("INV-3", 50, 10, InvoiceStatus::Paid),
        ];

        // 50 / 350 * 100 ≈ 14.29
        assert_eq!(collection_rate(&invoices), Decimal::new(14_29, 2));
    }

    #[test]
    fn collection_rate_is_zero_for_empty_or_zero_total() {
        assert_eq!(collection_rate(&[]), Decimal::ZERO);

        let zero = vec![invoice("INV-1", 0, 5, InvoiceStatus::Open)];
        assert_eq!(collection_rate(&zero), Decimal::ZERO);
    }

    #[test]
    fn top_overdue_ranks_by_amount_then_id() {
        let invoices = vec![
            invoice("INV-B", 200, 10, InvoiceStatus::Open),
            invoice("INV-C", 500, 40, InvoiceStatus::Overdue),
            invoice("INV-A", 200, 70, InvoiceStatus::Open),
            invoice("INV-D", 900, -5, InvoiceStatus::Open),
            invoice("INV-E", 800, 12, InvoiceStatus::Paid),
        ];

        let ranked = top_overdue(&invoices, as_of(), 10);
        let ids: Vec<&str> = ranked.iter().map(|entry| entry.id.0.as_str()).collect();

        // INV-D is not yet due, INV-E is paid; ties between A and B break on id.
        assert_eq!(ids, ["INV-C", "INV-A", "INV-B"]);
        assert_eq!(ranked[0].days_overdue, 40);
    }

    #[test]
    fn top_overdue_truncates_to_n() {
        let invoices = vec![
            invoice("INV-1", 100, 5, InvoiceStatus::Open),
            invoice("INV-2", 200, 5, InvoiceStatus::Open),
            invoice("INV-3", 300, 5, InvoiceStatus::Open),
        ];

        assert_eq!(top_overdue(&invoices, as_of(), 2).len(), 2);
    }

    #[test]
    fn summary_counts_overdue_against_outstanding() {
        let invoices = vec![
            invoice("INV-1", 100, 5, InvoiceStatus::Open),
            invoice("INV-2", 100, -5, InvoiceStatus::Open),
            invoice("INV-3", 200, 20, InvoiceStatus::Paid),
        ];

        let summary = summary(&invoices, as_of());
        assert_eq!(summary.total_amount, Decimal::from(400));
        assert_eq!(summary.outstanding_amount, Decimal::from(200));
        assert_eq!(summary.overdue_amount, Decimal::from(100));
        assert_eq!(summary.overdue_pct, Decimal::from(50));
        assert_eq!(summary.collection_rate_pct, Decimal::from(50));
    }
}
