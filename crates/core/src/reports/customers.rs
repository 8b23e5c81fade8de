use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aging::metrics::percentage;
use crate::domain::invoice::InvoiceStatus;
use crate::snapshot::InvoiceSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccount {
    pub customer_name: String,
    pub invoice_count: u32,
    pub total_amount: Decimal,
    pub collected_amount: Decimal,
    pub outstanding_amount: Decimal,
    pub overdue_amount: Decimal,
    pub collection_rate_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    /// Top accounts by outstanding balance.
    pub customers: Vec<CustomerAccount>,
    /// Distinct customers in the snapshot, before the top-N cut.
    pub customer_count: usize,
}

#[derive(Default)]
struct Tally {
    invoice_count: u32,
    total_amount: Decimal,
    collected_amount: Decimal,
    outstanding_amount: Decimal,
    overdue_amount: Decimal,
}

pub fn customer_report(
    snapshot: &InvoiceSnapshot,
    as_of: NaiveDate,
    top_n: usize,
) -> CustomerReport {
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();

    for invoice in &snapshot.invoices {
        let tally = tallies.entry(invoice.customer_name.clone()).or_default();
        tally.invoice_count += 1;
        tally.total_amount += invoice.amount;
        if invoice.status == InvoiceStatus::Paid {
            tally.collected_amount += invoice.amount;
        } else {
            tally.outstanding_amount += invoice.amount;
        }
        if invoice.is_past_due(as_of) {
            tally.overdue_amount += invoice.amount;
        }
    }

    let customer_count = tallies.len();
    let mut customers: Vec<CustomerAccount> = tallies
        .into_iter()
        .map(|(customer_name, tally)| CustomerAccount {
            customer_name,
            invoice_count: tally.invoice_count,
            total_amount: tally.total_amount,
            collected_amount: tally.collected_amount,
            outstanding_amount: tally.outstanding_amount,
            overdue_amount: tally.overdue_amount,
            collection_rate_pct: percentage(tally.collected_amount, tally.total_amount),
        })
        .collect();

    customers.sort_by(|a, b| {
        b.outstanding_amount
            .cmp(&a.outstanding_amount)
            .then_with(|| a.customer_name.cmp(&b.customer_name))
    });
    customers.truncate(top_n);

    CustomerReport { customers, customer_count }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use rust_decimal::Decimal;

    use super::customer_report;
    use crate::domain::invoice::{Invoice, InvoiceId, InvoiceStatus};
    use crate::snapshot::InvoiceSnapshot;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn invoice(id: &str, customer: &str, amount: i64, days_overdue: i64, status: InvoiceStatus) -> Invoice {
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
            customer_name: customer.to_string(),
            promise: None,
        }
    }

    #[test]
    fn ranks_customers_by_outstanding_balance() {
        let snapshot = InvoiceSnapshot::new(vec![
            invoice("INV-1", "Acme Inc", 100, 10, InvoiceStatus::Open),
            invoice("INV-2", "Acme Inc", 300, 0, InvoiceStatus::Paid),
            invoice("INV-3", "Globex", 250, 45, InvoiceStatus::Overdue),
            invoice("INV-4", "Initech", 40, -5, InvoiceStatus::Open),
        ]);

        let report = customer_report(&snapshot, as_of(), 10);

        assert_eq!(report.customer_count, 3);
        let globex = &report.customers[0];
        assert_eq!(globex.customer_name, "Globex");
        assert_eq!(globex.outstanding_amount, Decimal::from(250));
        assert_eq!(globex.overdue_amount, Decimal::from(250));

        let acme = &report.customers[1];
        assert_eq!(acme.customer_name, "Acme Inc");
        assert_eq!(acme.invoice_count, 2);
        assert_eq!(acme.collected_amount, Decimal::from(300));
        assert_eq!(acme.outstanding_amount, Decimal::from(100));
        assert_eq!(acme.collection_rate_pct, Decimal::from(75));

        let initech = &report.customers[2];
        assert_eq!(initech.overdue_amount, Decimal::ZERO);
    }

    #[test]
    fn top_n_cut_keeps_the_distinct_customer_count() {
        let snapshot = InvoiceSnapshot::new(vec![
            invoice("INV-1", "Acme Inc", 300, 10, InvoiceStatus::Open),
            invoice("INV-2", "Globex", 200, 10, InvoiceStatus::Open),
            invoice("INV-3", "Initech", 100, 10, InvoiceStatus::Open),
        ]);

        let report = customer_report(&snapshot, as_of(), 2);

        assert_eq!(report.customers.len(), 2);
        assert_eq!(report.customer_count, 3);
        assert_eq!(report.customers[0].customer_name, "Acme Inc");
    }

    #[test]
    fn empty_snapshot_produces_zeroed_report() {
        let report = customer_report(&InvoiceSnapshot::default(), as_of(), 5);

        assert!(report.customers.is_empty());
        assert_eq!(report.customer_count, 0);
    }
}
